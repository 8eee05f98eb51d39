//! Organization member role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a user can hold within an organization.
///
/// The organization owner is tracked separately on the organization row
/// and outranks every member role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Can manage events, sessions, members, and redeem tickets.
    Admin,
    /// Can view events and redeem tickets at the door.
    Member,
}

impl MemberRole {
    /// Check if this role can manage organization settings and members.
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = tickethub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(tickethub_core::AppError::validation(format!(
                "Invalid member role: '{s}'. Expected one of: admin, member"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<MemberRole>().unwrap(), MemberRole::Admin);
        assert_eq!("MEMBER".parse::<MemberRole>().unwrap(), MemberRole::Member);
        assert!("owner".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_manage_rights() {
        assert!(MemberRole::Admin.can_manage());
        assert!(!MemberRole::Member.can_manage());
    }
}
