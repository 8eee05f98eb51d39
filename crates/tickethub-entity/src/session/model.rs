//! Event session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One scheduled occurrence of an event, with its own date, location, and
/// seating capacity.
///
/// Capacity is fixed at creation/edit time and is never auto-adjusted by
/// ticket issuance. Remaining capacity is always derived by subtracting the
/// sum of `group_size` over issued tickets; there is no mutable counter.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// The owning event.
    pub event_id: Uuid,
    /// Session name.
    pub name: String,
    /// When the session takes place.
    pub starts_at: DateTime<Utc>,
    /// Venue or location.
    pub location: String,
    /// Seating capacity in admission units (people).
    pub capacity: i32,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Per-session admission statistics, aggregated over issued tickets.
///
/// All counts are in admission units (people), not ticket rows, so a group
/// ticket of 5 contributes 5 to `issued_headcount`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionStats {
    /// The session these statistics describe.
    pub session_id: Uuid,
    /// Number of ticket rows issued.
    pub ticket_count: i64,
    /// Total headcount issued (sum of `group_size`).
    pub issued_headcount: i64,
    /// Total headcount admitted so far (sum of `used_count`).
    pub admitted_headcount: i64,
    /// Number of tickets whose full headcount has been admitted.
    pub fully_used_count: i64,
}

/// Data required to create a new event session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventSession {
    /// Session name.
    pub name: String,
    /// When the session takes place.
    pub starts_at: DateTime<Utc>,
    /// Venue or location.
    pub location: String,
    /// Seating capacity (positive).
    pub capacity: i32,
}
