//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered staff account.
///
/// End-user ticket applicants do not have accounts; only organization
/// owners, members, and door staff authenticate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// E-mail address (unique, used for login).
    pub email: String,
    /// Argon2id password hash. Never serialized to API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new user account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
}
