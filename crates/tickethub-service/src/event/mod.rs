//! Event management and public listing.

pub mod service;

pub use service::{CreateEventRequest, EventSearch, EventService, UpdateEventRequest};
