//! # tickethub-api
//!
//! HTTP API layer for TicketHub built on Axum.
//!
//! Provides the REST endpoints, middleware (auth, CORS, compression,
//! logging), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
