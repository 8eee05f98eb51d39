//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A ticket issued against an event session.
///
/// One ticket represents either a single person (`is_group == false`,
/// `group_size == 1`) or a declared group of `group_size` people admitted
/// under one redemption code, possibly in partial batches across several
/// scans.
///
/// `used` and `fully_used` are derived from `used_count` and are recomputed
/// on every mutation; they are persisted only as query conveniences and are
/// never trusted from caller input.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: Uuid,
    /// Opaque redemption code encoded in the QR. Acts as a capability
    /// token: unguessable, unique, and the lookup key for scanning.
    pub code: Uuid,
    /// The session this ticket admits to. Never changes after creation.
    pub session_id: Uuid,
    /// Holder (applicant) name.
    pub name: String,
    /// Phonetic reading of the holder name.
    pub name_kana: String,
    /// Holder e-mail address.
    pub email: String,
    /// Free-text notes from the applicant.
    pub notes: Option<String>,
    /// Whether this is a group ticket.
    pub is_group: bool,
    /// Total headcount represented by this ticket (1 for individual).
    pub group_size: i32,
    /// Cumulative number of people admitted so far.
    pub used_count: i32,
    /// Derived: `used_count == group_size`.
    pub fully_used: bool,
    /// Derived: `used_count > 0`.
    pub used: bool,
    /// Timestamp of the first admission. Set once, never overwritten.
    pub used_at: Option<DateTime<Utc>>,
    /// Timestamp of the most recent admission or manual status change.
    pub last_used_at: Option<DateTime<Utc>>,
    /// When the ticket was issued.
    pub created_at: DateTime<Utc>,
    /// When the ticket row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Usage state of a ticket, derived from `used_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// No one has been admitted yet.
    Unused,
    /// Some, but not all, of the group has been admitted.
    PartiallyUsed,
    /// The full headcount has been admitted. Terminal except for manual
    /// override.
    FullyUsed,
}

impl Ticket {
    /// Usage state derived from the admission counters.
    pub fn status(&self) -> TicketStatus {
        if self.used_count == 0 {
            TicketStatus::Unused
        } else if self.used_count < self.group_size {
            TicketStatus::PartiallyUsed
        } else {
            TicketStatus::FullyUsed
        }
    }

    /// Headcount not yet admitted under this ticket.
    pub fn remaining_headcount(&self) -> i32 {
        self.group_size - self.used_count
    }

    /// Check the ticket's internal invariants.
    ///
    /// Returns a description of the first violated invariant, if any.
    /// Repositories call this before persisting a mutation.
    pub fn verify_invariants(&self) -> Result<(), String> {
        if self.group_size < 1 {
            return Err(format!("group_size must be >= 1, got {}", self.group_size));
        }
        if !self.is_group && self.group_size != 1 {
            return Err(format!(
                "individual ticket must have group_size == 1, got {}",
                self.group_size
            ));
        }
        if self.used_count < 0 || self.used_count > self.group_size {
            return Err(format!(
                "used_count {} outside [0, {}]",
                self.used_count, self.group_size
            ));
        }
        if self.fully_used != (self.used_count == self.group_size) {
            return Err("fully_used is inconsistent with used_count".to_string());
        }
        if self.used != (self.used_count > 0) {
            return Err("used is inconsistent with used_count".to_string());
        }
        if self.used && self.used_at.is_none() {
            return Err("used ticket is missing used_at".to_string());
        }
        Ok(())
    }
}

/// Data required to issue a new ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Fresh redemption code.
    pub code: Uuid,
    /// The session to issue against.
    pub session_id: Uuid,
    /// Holder name.
    pub name: String,
    /// Phonetic reading of the holder name.
    pub name_kana: String,
    /// Holder e-mail address.
    pub email: String,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Whether this is a group ticket.
    pub is_group: bool,
    /// Headcount represented by the ticket.
    pub group_size: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_ticket(is_group: bool, group_size: i32, used_count: i32) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            code: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            name: "Yamada Taro".to_string(),
            name_kana: "やまだ たろう".to_string(),
            email: "taro@example.com".to_string(),
            notes: None,
            is_group,
            group_size,
            used_count,
            fully_used: used_count == group_size,
            used: used_count > 0,
            used_at: (used_count > 0).then_some(now),
            last_used_at: (used_count > 0).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_follows_used_count() {
        assert_eq!(sample_ticket(true, 4, 0).status(), TicketStatus::Unused);
        assert_eq!(
            sample_ticket(true, 4, 2).status(),
            TicketStatus::PartiallyUsed
        );
        assert_eq!(sample_ticket(true, 4, 4).status(), TicketStatus::FullyUsed);
    }

    #[test]
    fn invariants_catch_drifted_flags() {
        let mut t = sample_ticket(true, 4, 2);
        assert!(t.verify_invariants().is_ok());

        t.fully_used = true;
        assert!(t.verify_invariants().is_err());

        let mut t = sample_ticket(false, 1, 0);
        t.group_size = 3;
        assert!(t.verify_invariants().is_err());
    }
}
