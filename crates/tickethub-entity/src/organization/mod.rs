//! Organization entity and membership.

pub mod model;
pub mod role;

pub use model::{CreateOrganization, Organization, OrganizationMember};
pub use role::MemberRole;
