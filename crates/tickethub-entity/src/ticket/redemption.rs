//! Pure redemption state machine for tickets.
//!
//! Governs every transition of a ticket's usage state:
//! unused → partially used → fully used. The functions here take a ticket
//! and return a mutated copy; they perform no I/O, which keeps the rules
//! testable without a database. Services run these transitions inside a
//! per-ticket transaction and persist the result.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use tickethub_core::AppError;

use super::model::Ticket;

/// How the operator chose to redeem a ticket at the door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionMode {
    /// Plain scan: admit the entire remaining headcount in one step.
    Whole,
    /// Group-mode scan with an optional size confirmation from the UI.
    /// Admits the entire remaining headcount, identically to [`Whole`],
    /// but is only valid for group tickets.
    ///
    /// [`Whole`]: RedemptionMode::Whole
    Group {
        /// Headcount the operator confirmed on screen. Informational; the
        /// admitted count is always the ticket's own `group_size`.
        declared_size: Option<i32>,
    },
    /// Admit `use_count` people out of the remaining headcount, leaving the
    /// ticket partially used unless the count reaches `group_size`.
    Partial {
        /// Number of people to admit now (>= 1).
        use_count: i32,
    },
}

/// Reasons a redemption transition is rejected. The ticket is left
/// untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedemptionError {
    /// The ticket belongs to a different session than the one the scanner
    /// is operating for. Guards against admitting at the wrong door.
    #[error("Ticket belongs to a different session")]
    SessionMismatch {
        /// The session the ticket was issued for.
        ticket_session: Uuid,
        /// The session selected in the scanning context.
        selected_session: Uuid,
    },
    /// The ticket's full headcount has already been admitted.
    #[error("Ticket has already been used for its full headcount")]
    AlreadyFullyUsed,
    /// A partial admission asked for more people than remain.
    #[error("Admission count exceeds the remaining headcount. Remaining: {remaining}")]
    PartialOverflow {
        /// Headcount still admissible under this ticket.
        remaining: i32,
    },
    /// Group-only redemption (group or partial mode) was requested for an
    /// individual ticket.
    #[error("Redemption mode requires a group ticket")]
    TicketTypeMismatch,
    /// A partial admission with a non-positive count.
    #[error("Admission count must be at least 1, got {given}")]
    InvalidUseCount {
        /// The rejected count.
        given: i32,
    },
    /// A manual override supplied a headcount outside `[0, group_size]`.
    #[error("Headcount {given} outside [0, {group_size}]")]
    HeadcountOutOfRange {
        /// The rejected count.
        given: i32,
        /// The ticket's total headcount.
        group_size: i32,
    },
}

impl From<RedemptionError> for AppError {
    fn from(err: RedemptionError) -> Self {
        match err {
            RedemptionError::SessionMismatch { .. } => {
                AppError::session_mismatch(err.to_string())
            }
            RedemptionError::AlreadyFullyUsed => AppError::already_fully_used(),
            RedemptionError::PartialOverflow { remaining } => {
                AppError::partial_overflow(remaining)
            }
            RedemptionError::TicketTypeMismatch => {
                AppError::ticket_type_mismatch(err.to_string())
            }
            RedemptionError::InvalidUseCount { .. }
            | RedemptionError::HeadcountOutOfRange { .. } => {
                AppError::validation(err.to_string())
            }
        }
    }
}

/// Redemption modes the UI should offer for a ticket in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AvailableModes {
    /// Whole/group redemption (admit everyone remaining) is applicable.
    pub whole: bool,
    /// Partial redemption is applicable.
    pub partial: bool,
}

/// Compute which redemption modes apply to the ticket's current state.
///
/// Pure function of ticket state so the scanner UI stays free of mutable
/// mode flags. Partial redemption is offered only for group tickets that
/// still have headcount remaining.
pub fn available_modes(ticket: &Ticket) -> AvailableModes {
    AvailableModes {
        whole: !ticket.fully_used,
        partial: ticket.is_group && !ticket.fully_used,
    }
}

/// Apply a scan-driven redemption to `ticket`.
///
/// Validates the selected session, the terminal state, and the chosen mode,
/// then returns a copy of the ticket with `used_count` advanced and the
/// derived fields (`used`, `fully_used`, `used_at`, `last_used_at`)
/// recomputed. The input ticket is never modified.
///
/// Whole and group modes always mean "admit everyone remaining": scanning a
/// partially used group ticket in whole mode jumps straight to fully used,
/// discarding the distinction between the prior partial count and the rest.
pub fn redeem(
    ticket: &Ticket,
    mode: RedemptionMode,
    selected_session: Uuid,
    now: DateTime<Utc>,
) -> Result<Ticket, RedemptionError> {
    if ticket.session_id != selected_session {
        return Err(RedemptionError::SessionMismatch {
            ticket_session: ticket.session_id,
            selected_session,
        });
    }
    if ticket.fully_used {
        return Err(RedemptionError::AlreadyFullyUsed);
    }

    let new_count = match mode {
        RedemptionMode::Whole => ticket.group_size,
        RedemptionMode::Group { .. } => {
            if !ticket.is_group {
                return Err(RedemptionError::TicketTypeMismatch);
            }
            ticket.group_size
        }
        RedemptionMode::Partial { use_count } => {
            if !ticket.is_group {
                return Err(RedemptionError::TicketTypeMismatch);
            }
            if use_count < 1 {
                return Err(RedemptionError::InvalidUseCount { given: use_count });
            }
            let remaining = ticket.remaining_headcount();
            if use_count > remaining {
                return Err(RedemptionError::PartialOverflow { remaining });
            }
            ticket.used_count + use_count
        }
    };

    Ok(apply_count(ticket, new_count, now))
}

/// Apply an administrative manual status override.
///
/// Bypasses the scan validations (no session-mismatch or already-fully-used
/// checks). For group tickets `used_count` is taken from the input, falling
/// back to all-or-nothing based on `used` when absent; for individual
/// tickets the count is derived from `used` alone. `used` and `fully_used`
/// are always recomputed from the resulting count, never accepted from the
/// caller.
pub fn manual_set_status(
    ticket: &Ticket,
    used: bool,
    used_count: Option<i32>,
    now: DateTime<Utc>,
) -> Result<Ticket, RedemptionError> {
    let new_count = if ticket.is_group {
        let count = used_count.unwrap_or(if used { ticket.group_size } else { 0 });
        if count < 0 || count > ticket.group_size {
            return Err(RedemptionError::HeadcountOutOfRange {
                given: count,
                group_size: ticket.group_size,
            });
        }
        count
    } else if used {
        1
    } else {
        0
    };

    Ok(apply_count(ticket, new_count, now))
}

/// Set `used_count` and recompute every derived field.
///
/// `used_at` is set only on the 0 → nonzero edge and never overwritten;
/// `last_used_at` is touched whenever the count actually changes.
fn apply_count(ticket: &Ticket, new_count: i32, now: DateTime<Utc>) -> Ticket {
    let mut updated = ticket.clone();
    let changed = new_count != ticket.used_count;

    updated.used_count = new_count;
    updated.fully_used = new_count == updated.group_size;
    updated.used = new_count > 0;

    if ticket.used_count == 0 && new_count > 0 && updated.used_at.is_none() {
        updated.used_at = Some(now);
    }
    if changed {
        updated.last_used_at = Some(now);
        updated.updated_at = now;
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::model::TicketStatus;

    fn ticket(is_group: bool, group_size: i32, used_count: i32) -> Ticket {
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
    fn whole_redeems_individual_ticket() {
        let t = ticket(false, 1, 0);
        let redeemed = redeem(&t, RedemptionMode::Whole, t.session_id, Utc::now()).unwrap();

        assert_eq!(redeemed.used_count, 1);
        assert!(redeemed.used);
        assert!(redeemed.fully_used);
        assert!(redeemed.used_at.is_some());
        assert!(redeemed.last_used_at.is_some());
        assert!(redeemed.verify_invariants().is_ok());
    }

    #[test]
    fn group_mode_rejects_individual_ticket() {
        let t = ticket(false, 1, 0);
        let err = redeem(
            &t,
            RedemptionMode::Group {
                declared_size: Some(1),
            },
            t.session_id,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, RedemptionError::TicketTypeMismatch);
    }

    #[test]
    fn partial_mode_rejects_individual_ticket() {
        let t = ticket(false, 1, 0);
        let err = redeem(
            &t,
            RedemptionMode::Partial { use_count: 1 },
            t.session_id,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, RedemptionError::TicketTypeMismatch);
    }

    #[test]
    fn partial_redemption_accumulates() {
        // Scenario B: group of 5, admit 3, then 2, then reject a 6th person.
        let t = ticket(true, 5, 0);
        let now = Utc::now();

        let t = redeem(
            &t,
            RedemptionMode::Partial { use_count: 3 },
            t.session_id,
            now,
        )
        .unwrap();
        assert_eq!(t.used_count, 3);
        assert!(t.used);
        assert!(!t.fully_used);
        assert_eq!(t.status(), TicketStatus::PartiallyUsed);

        let t = redeem(
            &t,
            RedemptionMode::Partial { use_count: 2 },
            t.session_id,
            now,
        )
        .unwrap();
        assert_eq!(t.used_count, 5);
        assert!(t.fully_used);

        let err = redeem(
            &t,
            RedemptionMode::Partial { use_count: 1 },
            t.session_id,
            now,
        )
        .unwrap_err();
        assert_eq!(err, RedemptionError::AlreadyFullyUsed);
        assert_eq!(t.used_count, 5);
    }

    #[test]
    fn partial_batches_match_single_batch() {
        // Redeeming a then b equals redeeming a+b in one step.
        let base = ticket(true, 7, 0);
        let now = Utc::now();

        let split = redeem(
            &base,
            RedemptionMode::Partial { use_count: 2 },
            base.session_id,
            now,
        )
        .and_then(|t| {
            redeem(
                &t,
                RedemptionMode::Partial { use_count: 4 },
                t.session_id,
                now,
            )
        })
        .unwrap();

        let single = redeem(
            &base,
            RedemptionMode::Partial { use_count: 6 },
            base.session_id,
            now,
        )
        .unwrap();

        assert_eq!(split.used_count, single.used_count);
        assert_eq!(split.fully_used, single.fully_used);
    }

    #[test]
    fn partial_overflow_reports_remaining() {
        // Scenario C: group of 4, nobody admitted, 5 people at the door.
        let t = ticket(true, 4, 0);
        let err = redeem(
            &t,
            RedemptionMode::Partial { use_count: 5 },
            t.session_id,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, RedemptionError::PartialOverflow { remaining: 4 });
    }

    #[test]
    fn partial_overflow_accounts_for_prior_admissions() {
        let t = ticket(true, 4, 3);
        let err = redeem(
            &t,
            RedemptionMode::Partial { use_count: 2 },
            t.session_id,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, RedemptionError::PartialOverflow { remaining: 1 });
    }

    #[test]
    fn zero_use_count_is_rejected() {
        let t = ticket(true, 4, 0);
        let err = redeem(
            &t,
            RedemptionMode::Partial { use_count: 0 },
            t.session_id,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, RedemptionError::InvalidUseCount { given: 0 });
    }

    #[test]
    fn session_mismatch_rejects_without_mutation() {
        // Scenario D: ticket for S1 scanned at S2's door.
        let t = ticket(false, 1, 0);
        let other_session = Uuid::new_v4();

        let err = redeem(&t, RedemptionMode::Whole, other_session, Utc::now()).unwrap_err();
        assert!(matches!(err, RedemptionError::SessionMismatch { .. }));
        assert_eq!(t.used_count, 0);

        // Same scan against the correct session succeeds.
        assert!(redeem(&t, RedemptionMode::Whole, t.session_id, Utc::now()).is_ok());
    }

    #[test]
    fn whole_mode_on_partial_ticket_admits_everyone_remaining() {
        // Whole-group redemption of an already-partially-used ticket jumps
        // straight to fully used; prior partial progress is not added to.
        let t = ticket(true, 6, 2);
        let redeemed = redeem(
            &t,
            RedemptionMode::Group {
                declared_size: Some(6),
            },
            t.session_id,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(redeemed.used_count, 6);
        assert!(redeemed.fully_used);
    }

    #[test]
    fn fully_used_is_terminal_for_scans() {
        let t = ticket(true, 3, 3);
        for mode in [
            RedemptionMode::Whole,
            RedemptionMode::Group {
                declared_size: None,
            },
            RedemptionMode::Partial { use_count: 1 },
        ] {
            let err = redeem(&t, mode, t.session_id, Utc::now()).unwrap_err();
            assert_eq!(err, RedemptionError::AlreadyFullyUsed);
        }
    }

    #[test]
    fn used_at_is_set_once_and_kept() {
        let t = ticket(true, 4, 0);
        let first = Utc::now();
        let t = redeem(
            &t,
            RedemptionMode::Partial { use_count: 1 },
            t.session_id,
            first,
        )
        .unwrap();
        let first_used_at = t.used_at;
        assert_eq!(first_used_at, Some(first));

        let later = first + chrono::Duration::minutes(10);
        let t = redeem(
            &t,
            RedemptionMode::Partial { use_count: 1 },
            t.session_id,
            later,
        )
        .unwrap();
        assert_eq!(t.used_at, first_used_at);
        assert_eq!(t.last_used_at, Some(later));
    }

    #[test]
    fn manual_override_sets_group_count_directly() {
        let t = ticket(true, 5, 0);
        let t = manual_set_status(&t, true, Some(2), Utc::now()).unwrap();
        assert_eq!(t.used_count, 2);
        assert!(t.used);
        assert!(!t.fully_used);

        // Derived flags are recomputed, not taken from `used`.
        let t = manual_set_status(&t, false, Some(5), Utc::now()).unwrap();
        assert_eq!(t.used_count, 5);
        assert!(t.used);
        assert!(t.fully_used);
    }

    #[test]
    fn manual_override_rejects_count_above_group_size() {
        let t = ticket(true, 5, 0);
        let err = manual_set_status(&t, true, Some(6), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            RedemptionError::HeadcountOutOfRange {
                given: 6,
                group_size: 5
            }
        );
    }

    #[test]
    fn manual_override_on_individual_ticket_ignores_count() {
        let t = ticket(false, 1, 0);
        let t = manual_set_status(&t, true, Some(9), Utc::now()).unwrap();
        assert_eq!(t.used_count, 1);
        assert!(t.fully_used);

        let t = manual_set_status(&t, false, None, Utc::now()).unwrap();
        assert_eq!(t.used_count, 0);
        assert!(!t.used);
        assert!(!t.fully_used);
    }

    #[test]
    fn manual_override_can_reopen_fully_used_ticket() {
        let t = ticket(true, 3, 3);
        let t = manual_set_status(&t, true, Some(1), Utc::now()).unwrap();
        assert_eq!(t.used_count, 1);
        assert!(!t.fully_used);
        // Original used_at is preserved.
        assert!(t.used_at.is_some());
    }

    #[test]
    fn manual_override_without_change_keeps_last_used_at() {
        let t = ticket(true, 4, 2);
        let before = t.last_used_at;
        let t2 = manual_set_status(&t, true, Some(2), Utc::now()).unwrap();
        assert_eq!(t2.last_used_at, before);
    }

    #[test]
    fn modes_follow_ticket_state() {
        let unused_group = ticket(true, 4, 0);
        assert_eq!(
            available_modes(&unused_group),
            AvailableModes {
                whole: true,
                partial: true
            }
        );

        let partial_group = ticket(true, 4, 2);
        assert_eq!(
            available_modes(&partial_group),
            AvailableModes {
                whole: true,
                partial: true
            }
        );

        let individual = ticket(false, 1, 0);
        assert_eq!(
            available_modes(&individual),
            AvailableModes {
                whole: true,
                partial: false
            }
        );

        let done = ticket(true, 4, 4);
        assert_eq!(
            available_modes(&done),
            AvailableModes {
                whole: false,
                partial: false
            }
        );
    }
}
