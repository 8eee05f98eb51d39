//! # tickethub-core
//!
//! Core crate for TicketHub. Contains configuration schemas, pagination
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TicketHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
