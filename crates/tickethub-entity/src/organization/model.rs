//! Organization entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::MemberRole;

/// An organization that hosts events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: Uuid,
    /// Organization name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Logo image URL.
    pub logo_url: Option<String>,
    /// The user who owns the organization.
    pub owner_id: Uuid,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
    /// When the organization was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user's membership in an organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationMember {
    /// Unique membership identifier.
    pub id: Uuid,
    /// The member user.
    pub user_id: Uuid,
    /// The organization.
    pub organization_id: Uuid,
    /// The member's role within the organization.
    pub role: MemberRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new organization.
#[derive(Debug, Clone)]
pub struct CreateOrganization {
    /// Organization name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Logo image URL.
    pub logo_url: Option<String>,
    /// The owning user.
    pub owner_id: Uuid,
}
