//! Staff account registration and login.

pub mod service;

pub use service::{AccountService, AuthenticatedUser, LoginRequest, RegisterRequest};
