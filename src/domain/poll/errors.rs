//! Poll and vote error types.
//!
//! `VoteError` is the rejection taxonomy for vote submission; `PollError`
//! covers catalog operations and results queries. Both convert from the
//! port-level `DomainError`.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, PollId, ValidationError};

/// Reasons a vote submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// Poll (or referenced option) does not exist.
    #[error("Poll not found: {0}")]
    NotFound(PollId),

    /// Poll exists but is closed.
    #[error("Poll {0} is closed")]
    Inactive(PollId),

    /// Payload shape does not match the poll kind.
    #[error("Invalid vote: {0}")]
    InvalidPayload(String),

    /// Rating outside the configured bounds.
    #[error("Rating {value} is outside {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    /// Storage failed; the vote was not recorded.
    #[error("Error: {0}")]
    Infrastructure(String),
}

impl VoteError {
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        VoteError::InvalidPayload(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            VoteError::NotFound(_) => ErrorCode::PollNotFound,
            VoteError::Inactive(_) => ErrorCode::PollInactive,
            VoteError::InvalidPayload(_) => ErrorCode::InvalidPayload,
            VoteError::OutOfRange { .. } => ErrorCode::OutOfRange,
            VoteError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for VoteError {
    fn from(err: DomainError) -> Self {
        VoteError::Infrastructure(err.to_string())
    }
}

/// Errors from poll catalog operations and results queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Poll not found: {0}")]
    NotFound(PollId),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl PollError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PollError::NotFound(_) => ErrorCode::PollNotFound,
            PollError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PollError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<ValidationError> for PollError {
    fn from(err: ValidationError) -> Self {
        PollError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for PollError {
    fn from(err: DomainError) -> Self {
        PollError::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_error_codes_follow_taxonomy() {
        let id = PollId::new(1);
        assert_eq!(VoteError::NotFound(id).code(), ErrorCode::PollNotFound);
        assert_eq!(VoteError::Inactive(id).code(), ErrorCode::PollInactive);
        assert_eq!(
            VoteError::invalid_payload("x").code(),
            ErrorCode::InvalidPayload
        );
        assert_eq!(
            VoteError::OutOfRange {
                value: 9,
                min: 1,
                max: 5
            }
            .code(),
            ErrorCode::OutOfRange
        );
    }

    #[test]
    fn out_of_range_message_names_bounds() {
        let err = VoteError::OutOfRange {
            value: 0,
            min: 1,
            max: 5,
        };
        assert_eq!(err.to_string(), "Rating 0 is outside 1..=5");
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: PollError = ValidationError::empty_field("question").into();
        match err {
            PollError::ValidationFailed { field, .. } => assert_eq!(field, "question"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn domain_error_becomes_infrastructure() {
        let err: VoteError = DomainError::new(ErrorCode::DatabaseError, "down").into();
        assert!(matches!(err, VoteError::Infrastructure(_)));
    }
}
