//! HTTP middleware.

pub mod compression;
pub mod cors;
pub mod logging;
