//! Event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An event hosted by an organization.
///
/// An event owns one or more [`EventSession`](crate::session::EventSession)s;
/// tickets are always issued against a session, never the event itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// The hosting organization.
    pub organization_id: Uuid,
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Search tags.
    pub tags: Vec<String>,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
    /// When the event was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new event.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    /// The hosting organization.
    pub organization_id: Uuid,
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Search tags.
    pub tags: Vec<String>,
}
