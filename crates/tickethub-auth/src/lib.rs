//! # tickethub-auth
//!
//! Staff authentication for TicketHub: JWT issuance and validation, and
//! Argon2id password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
