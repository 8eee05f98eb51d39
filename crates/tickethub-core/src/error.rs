//! Unified application error types for TicketHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Authentication failed (invalid credentials, expired token, etc.).
    Authentication,
    /// The caller does not have permission to perform the action.
    Authorization,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, restricted delete, etc.).
    Conflict,
    /// Issuance would exceed the session's remaining capacity.
    CapacityExceeded,
    /// A partial redemption exceeds the ticket's remaining headcount.
    PartialOverflow,
    /// The ticket is already fully used; the scan changed nothing.
    AlreadyFullyUsed,
    /// The ticket belongs to a different session than the one selected.
    SessionMismatch,
    /// The redemption mode does not match the ticket kind.
    TicketTypeMismatch,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A mail delivery error occurred.
    Mail,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::CapacityExceeded => write!(f, "CAPACITY_EXCEEDED"),
            Self::PartialOverflow => write!(f, "PARTIAL_OVERFLOW"),
            Self::AlreadyFullyUsed => write!(f, "ALREADY_FULLY_USED"),
            Self::SessionMismatch => write!(f, "SESSION_MISMATCH"),
            Self::TicketTypeMismatch => write!(f, "TICKET_TYPE_MISMATCH"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Mail => write!(f, "MAIL"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified application error used throughout TicketHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. Business-rule violations that carry a
/// numeric allowance (remaining seats, remaining headcount) expose it via
/// `details` so the API layer can return it in a structured form.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Structured details (e.g. `{"remaining": 3}`).
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a capacity-exceeded error carrying the actual remaining count.
    ///
    /// `remaining` may be negative when the session capacity was edited
    /// downward after issuance; it is reported as-is.
    pub fn capacity_exceeded(remaining: i64) -> Self {
        Self::new(
            ErrorKind::CapacityExceeded,
            format!("Session capacity exceeded. Remaining: {remaining}"),
        )
        .with_details(serde_json::json!({ "remaining": remaining }))
    }

    /// Create a partial-overflow error carrying the remaining headcount.
    pub fn partial_overflow(remaining: i32) -> Self {
        Self::new(
            ErrorKind::PartialOverflow,
            format!("Admission count exceeds the remaining headcount. Remaining: {remaining}"),
        )
        .with_details(serde_json::json!({ "remaining": remaining }))
    }

    /// Create an already-fully-used error.
    pub fn already_fully_used() -> Self {
        Self::new(
            ErrorKind::AlreadyFullyUsed,
            "This ticket has already been used for its full headcount",
        )
    }

    /// Create a session-mismatch error.
    pub fn session_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionMismatch, message)
    }

    /// Create a ticket-type-mismatch error.
    pub fn ticket_type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TicketTypeMismatch, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a mail delivery error.
    pub fn mail(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Mail, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_carries_remaining() {
        let err = AppError::capacity_exceeded(3);
        assert_eq!(err.kind, ErrorKind::CapacityExceeded);
        assert_eq!(err.details, Some(serde_json::json!({ "remaining": 3 })));
        assert!(err.message.contains("3"));
    }

    #[test]
    fn capacity_exceeded_reports_negative_remaining() {
        let err = AppError::capacity_exceeded(-2);
        assert_eq!(err.details, Some(serde_json::json!({ "remaining": -2 })));
    }

    #[test]
    fn partial_overflow_carries_remaining() {
        let err = AppError::partial_overflow(4);
        assert_eq!(err.kind, ErrorKind::PartialOverflow);
        assert_eq!(err.details, Some(serde_json::json!({ "remaining": 4 })));
    }
}
