//! Unified application error types for VaxTrack.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Domain rule violations additionally
//! carry a stable [`ErrorCode`] so callers can branch on the exact condition
//! without parsing messages.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found (or is soft-deleted).
    NotFound,
    /// Input validation failed (malformed or business-rule-violating input).
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// The caller does not have permission to perform the action.
    Forbidden,
    /// A dose ordering or spacing rule was violated.
    SequenceViolation,
    /// The targeted resource exists but cannot serve the request
    /// (wrong status, expired, exhausted).
    Unavailable,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::SequenceViolation => write!(f, "SEQUENCE_VIOLATION"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Stable domain error codes.
///
/// Each code identifies one business-rule failure condition. Codes are part
/// of the external contract: clients and tests match on them, so variants
/// are never renamed or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The referenced user does not exist or is soft-deleted.
    UserNotFound,
    /// The referenced vaccine does not exist or is soft-deleted.
    VaccineNotFound,
    /// The referenced batch does not exist or is soft-deleted.
    BatchNotFound,
    /// The referenced scheduling does not exist or is soft-deleted.
    SchedulingNotFound,
    /// The referenced application does not exist.
    ApplicationNotFound,
    /// A dose for this (user, vaccine, dose number) is already recorded
    /// or actively scheduled.
    DuplicateDose,
    /// A batch with this batch number already exists.
    BatchNumberAlreadyExists,
    /// The dose number exceeds the vaccine's required dose count.
    ExceededRequiredDoses,
    /// Dose N was requested before dose N-1 exists.
    InvalidDoseSequence,
    /// Not enough days have elapsed since the previous dose.
    MinimumIntervalNotMet,
    /// The batch has fewer units than the requested decrement.
    InsufficientQuantity,
    /// The batch cannot serve doses (wrong status, expired, or exhausted).
    BatchNotAvailable,
    /// The scheduling is completed and can no longer be modified.
    SchedulingAlreadyCompleted,
    /// The caller may not view or modify this scheduling.
    UnauthorizedSchedulingAccess,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound => write!(f, "USER_NOT_FOUND"),
            Self::VaccineNotFound => write!(f, "VACCINE_NOT_FOUND"),
            Self::BatchNotFound => write!(f, "BATCH_NOT_FOUND"),
            Self::SchedulingNotFound => write!(f, "SCHEDULING_NOT_FOUND"),
            Self::ApplicationNotFound => write!(f, "APPLICATION_NOT_FOUND"),
            Self::DuplicateDose => write!(f, "DUPLICATE_DOSE"),
            Self::BatchNumberAlreadyExists => write!(f, "BATCH_NUMBER_ALREADY_EXISTS"),
            Self::ExceededRequiredDoses => write!(f, "EXCEEDED_REQUIRED_DOSES"),
            Self::InvalidDoseSequence => write!(f, "INVALID_DOSE_SEQUENCE"),
            Self::MinimumIntervalNotMet => write!(f, "MINIMUM_INTERVAL_NOT_MET"),
            Self::InsufficientQuantity => write!(f, "INSUFFICIENT_QUANTITY"),
            Self::BatchNotAvailable => write!(f, "BATCH_NOT_AVAILABLE"),
            Self::SchedulingAlreadyCompleted => write!(f, "SCHEDULING_ALREADY_COMPLETED"),
            Self::UnauthorizedSchedulingAccess => write!(f, "UNAUTHORIZED_SCHEDULING_ACCESS"),
        }
    }
}

/// The unified application error used throughout VaxTrack.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. Domain failures set `code`; infrastructure
/// failures leave it `None` and rely on `kind` alone.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// Stable domain error code, when the failure is a business-rule one.
    pub code: Option<ErrorCode>,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with a stable domain code.
    pub fn with_code(kind: ErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: Some(code),
            message: message.into(),
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
            code: None,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check whether this error carries the given domain code.
    pub fn is_code(&self, code: ErrorCode) -> bool {
        self.code == Some(code)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
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

    /// The referenced user is absent or soft-deleted.
    pub fn user_not_found(user_id: impl fmt::Display) -> Self {
        Self::with_code(
            ErrorKind::NotFound,
            ErrorCode::UserNotFound,
            format!("User {user_id} not found"),
        )
    }

    /// The referenced vaccine is absent or soft-deleted.
    pub fn vaccine_not_found(vaccine_id: impl fmt::Display) -> Self {
        Self::with_code(
            ErrorKind::NotFound,
            ErrorCode::VaccineNotFound,
            format!("Vaccine {vaccine_id} not found"),
        )
    }

    /// The referenced batch is absent or soft-deleted.
    pub fn batch_not_found(batch_id: impl fmt::Display) -> Self {
        Self::with_code(
            ErrorKind::NotFound,
            ErrorCode::BatchNotFound,
            format!("Batch {batch_id} not found"),
        )
    }

    /// The referenced scheduling is absent or soft-deleted.
    pub fn scheduling_not_found(scheduling_id: impl fmt::Display) -> Self {
        Self::with_code(
            ErrorKind::NotFound,
            ErrorCode::SchedulingNotFound,
            format!("Scheduling {scheduling_id} not found"),
        )
    }

    /// The referenced application is absent.
    pub fn application_not_found(application_id: impl fmt::Display) -> Self {
        Self::with_code(
            ErrorKind::NotFound,
            ErrorCode::ApplicationNotFound,
            format!("Application {application_id} not found"),
        )
    }

    /// A dose for this (user, vaccine, dose number) already exists.
    pub fn duplicate_dose(dose_number: i32) -> Self {
        Self::with_code(
            ErrorKind::Conflict,
            ErrorCode::DuplicateDose,
            format!("Dose {dose_number} is already recorded or actively scheduled for this user and vaccine"),
        )
    }

    /// Batch number uniqueness violated.
    pub fn batch_number_exists(batch_number: &str) -> Self {
        Self::with_code(
            ErrorKind::Conflict,
            ErrorCode::BatchNumberAlreadyExists,
            format!("Batch number '{batch_number}' already exists"),
        )
    }

    /// The dose number exceeds the vaccine's required dose count.
    pub fn exceeded_required_doses(dose_number: i32, doses_required: i32) -> Self {
        Self::with_code(
            ErrorKind::SequenceViolation,
            ErrorCode::ExceededRequiredDoses,
            format!("Dose {dose_number} exceeds the {doses_required} required dose(s) for this vaccine"),
        )
    }

    /// Dose N requested before dose N-1 exists.
    pub fn invalid_dose_sequence(dose_number: i32) -> Self {
        Self::with_code(
            ErrorKind::SequenceViolation,
            ErrorCode::InvalidDoseSequence,
            format!(
                "Dose {dose_number} cannot be recorded before dose {} exists",
                dose_number - 1
            ),
        )
    }

    /// Minimum interval between consecutive doses not met.
    pub fn minimum_interval_not_met(required_days: i64, actual_days: i64) -> Self {
        Self::with_code(
            ErrorKind::SequenceViolation,
            ErrorCode::MinimumIntervalNotMet,
            format!(
                "Minimum interval between doses not met: required {required_days} day(s), only {actual_days} elapsed"
            ),
        )
    }

    /// The batch cannot cover the requested decrement.
    pub fn insufficient_quantity(batch_id: impl fmt::Display, requested: i32) -> Self {
        Self::with_code(
            ErrorKind::Unavailable,
            ErrorCode::InsufficientQuantity,
            format!("Batch {batch_id} does not have {requested} unit(s) available"),
        )
    }

    /// The batch cannot serve doses in its current state.
    pub fn batch_not_available(reason: impl Into<String>) -> Self {
        Self::with_code(
            ErrorKind::Unavailable,
            ErrorCode::BatchNotAvailable,
            format!("Batch is not available: {}", reason.into()),
        )
    }

    /// A completed scheduling was targeted by an update.
    pub fn scheduling_already_completed(scheduling_id: impl fmt::Display) -> Self {
        Self::with_code(
            ErrorKind::Conflict,
            ErrorCode::SchedulingAlreadyCompleted,
            format!("Scheduling {scheduling_id} is completed and can no longer be modified"),
        )
    }

    /// The caller may not act on this scheduling.
    pub fn unauthorized_scheduling_access() -> Self {
        Self::with_code(
            ErrorKind::Forbidden,
            ErrorCode::UnauthorizedSchedulingAccess,
            "Only the scheduling owner or a manager may perform this action",
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            code: self.code,
            message: self.message.clone(),
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
    fn test_domain_constructors_set_code_and_kind() {
        let err = AppError::duplicate_dose(2);
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.is_code(ErrorCode::DuplicateDose));

        let err = AppError::minimum_interval_not_met(21, 10);
        assert_eq!(err.kind, ErrorKind::SequenceViolation);
        assert!(err.message.contains("21"));
        assert!(err.message.contains("10"));
    }

    #[test]
    fn test_infra_constructors_carry_no_code() {
        let err = AppError::database("connection refused");
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(err.code.is_none());
    }
}
