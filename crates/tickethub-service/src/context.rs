//! Request context carrying the authenticated staff user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Extracted by the API layer from the session token and passed into
/// service methods so that every operation knows who is acting.
/// Organization roles are not carried here; services resolve membership
/// per organization at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's email (convenience field from JWT claims).
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, email: String) -> Self {
        Self {
            user_id,
            email,
            request_time: Utc::now(),
        }
    }
}
