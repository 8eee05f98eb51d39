//! HTTP request handlers, grouped by domain.

pub mod auth;
pub mod event;
pub mod health;
pub mod organization;
pub mod session;
pub mod ticket;
