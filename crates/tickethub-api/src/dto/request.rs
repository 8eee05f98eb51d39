//! Request body DTOs for the HTTP API.
//!
//! Wire-level validation (lengths, formats) lives here via `validator`;
//! business rules (capacity, redemption state) live in the service layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tickethub_entity::ticket::RedemptionMode;
use tickethub_service::ticket::issue::IssueTicketsRequest;

/// Public ticket application body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueTicketsDto {
    /// The session to issue against.
    pub session_id: Uuid,
    /// Applicant name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Phonetic reading of the applicant name.
    #[validate(length(min = 1, max = 100))]
    pub name_kana: String,
    /// Applicant e-mail address.
    #[validate(email)]
    pub email: String,
    /// Free-text notes.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Whether to issue one group ticket instead of individual tickets.
    #[serde(default)]
    pub is_group: bool,
    /// Headcount of the group ticket.
    pub group_size: Option<i32>,
    /// Number of individual tickets to issue.
    pub quantity: Option<i32>,
}

impl From<IssueTicketsDto> for IssueTicketsRequest {
    fn from(dto: IssueTicketsDto) -> Self {
        IssueTicketsRequest {
            session_id: dto.session_id,
            name: dto.name,
            name_kana: dto.name_kana,
            email: dto.email,
            notes: dto.notes,
            is_group: dto.is_group,
            group_size: dto.group_size,
            quantity: dto.quantity,
        }
    }
}

/// Scan-time redemption body, tagged by mode.
///
/// `current_session_id` is the session the scanner is operating for and is
/// required for every scan mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RedeemRequest {
    /// Admit the entire remaining headcount.
    Whole {
        /// The scanner's selected session.
        current_session_id: Uuid,
    },
    /// Group-mode admission of the entire remaining headcount.
    Group {
        /// The scanner's selected session.
        current_session_id: Uuid,
        /// Headcount confirmed on screen (informational).
        declared_size: Option<i32>,
    },
    /// Admit part of a group.
    Partial {
        /// The scanner's selected session.
        current_session_id: Uuid,
        /// Number of people to admit now.
        use_count: i32,
    },
}

impl RedeemRequest {
    /// Splits into the domain redemption mode and the scanner's session.
    pub fn into_parts(self) -> (RedemptionMode, Uuid) {
        match self {
            Self::Whole { current_session_id } => (RedemptionMode::Whole, current_session_id),
            Self::Group {
                current_session_id,
                declared_size,
            } => (RedemptionMode::Group { declared_size }, current_session_id),
            Self::Partial {
                current_session_id,
                use_count,
            } => (RedemptionMode::Partial { use_count }, current_session_id),
        }
    }
}

/// Administrative status override body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualStatusDto {
    /// Target used state.
    pub used: bool,
    /// Explicit headcount for group tickets.
    pub used_count: Option<i32>,
}

/// Body for adding an organization member by email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddMemberDto {
    /// E-mail of the user to enroll.
    #[validate(email)]
    pub email: String,
    /// Role to grant, `admin` or `member`.
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeem_request_parses_tagged_modes() {
        let session = Uuid::new_v4();
        let json = format!(
            r#"{{"mode": "partial", "current_session_id": "{session}", "use_count": 3}}"#
        );
        let req: RedeemRequest = serde_json::from_str(&json).unwrap();
        let (mode, sid) = req.into_parts();
        assert_eq!(mode, RedemptionMode::Partial { use_count: 3 });
        assert_eq!(sid, session);

        let json = format!(r#"{{"mode": "whole", "current_session_id": "{session}"}}"#);
        let req: RedeemRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.into_parts().0, RedemptionMode::Whole);
    }

    #[test]
    fn issue_dto_validates_email() {
        let dto = IssueTicketsDto {
            session_id: Uuid::new_v4(),
            name: "Yamada".to_string(),
            name_kana: "やまだ".to_string(),
            email: "not-an-email".to_string(),
            notes: None,
            is_group: false,
            group_size: None,
            quantity: None,
        };
        assert!(dto.validate().is_err());
    }
}
