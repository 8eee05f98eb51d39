//! Capacity ledger arithmetic.
//!
//! A session's occupancy is the sum of `group_size` over every ticket
//! issued against it, counted in people rather than ticket rows. Nothing
//! is ever subtracted: redemption does not free seats and there is no
//! cancellation. Remaining capacity is always derived, never stored.

use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;

/// Remaining capacity for a session given its configured capacity and the
/// issued headcount.
///
/// May be negative when the capacity was edited below the already issued
/// headcount. Negative values are reported as-is so operators can see the
/// size of the overbooking.
pub fn remaining_capacity(capacity: i32, issued_headcount: i64) -> i64 {
    capacity as i64 - issued_headcount
}

/// Check whether `requested` additional seats fit into the session.
///
/// The whole request is atomic: a request for 3 seats with 2 remaining is
/// rejected outright rather than partially filled. The error carries the
/// actual remaining count for the caller to surface.
pub fn check_issuable(capacity: i32, issued_headcount: i64, requested: i64) -> AppResult<()> {
    let remaining = remaining_capacity(capacity, issued_headcount);
    if requested > remaining {
        return Err(AppError::capacity_exceeded(remaining));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickethub_core::error::ErrorKind;

    #[test]
    fn exact_fit_is_allowed() {
        assert!(check_issuable(10, 7, 3).is_ok());
    }

    #[test]
    fn overflow_is_rejected_with_remaining() {
        let err = check_issuable(10, 8, 3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CapacityExceeded);
        assert_eq!(err.details, Some(serde_json::json!({ "remaining": 2 })));
    }

    #[test]
    fn full_session_rejects_single_seat() {
        let err = check_issuable(10, 10, 1).unwrap_err();
        assert_eq!(err.details, Some(serde_json::json!({ "remaining": 0 })));
    }

    #[test]
    fn capacity_lowered_below_issuance_reports_negative() {
        // Capacity edited from 20 down to 5 after 8 seats were issued.
        assert_eq!(remaining_capacity(5, 8), -3);
        let err = check_issuable(5, 8, 1).unwrap_err();
        assert_eq!(err.details, Some(serde_json::json!({ "remaining": -3 })));
    }

    #[test]
    fn group_sizes_count_as_people() {
        // Session of 10 with one group ticket of 4: a group of 7 no longer
        // fits, a group of 6 does.
        assert!(check_issuable(10, 4, 7).is_err());
        assert!(check_issuable(10, 4, 6).is_ok());
    }
}
