//! Event session management and admission statistics.

pub mod service;

pub use service::{SessionOccupancy, SessionService, UpdateSessionRequest};
