//! Event session entity.

pub mod model;

pub use model::{CreateEventSession, EventSession, SessionStats};
