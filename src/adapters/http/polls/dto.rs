//! HTTP DTOs for poll endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ErrorCode, OptionId};
use crate::domain::poll::{Poll, PollKind, Vote, VoteSubmission};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create a new poll.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: PollKind,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Free-form vote value. Rating clients often send a bare JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VoteValue {
    Text(String),
    Number(serde_json::Number),
}

impl VoteValue {
    pub fn into_text(self) -> String {
        match self {
            VoteValue::Text(text) => text,
            VoteValue::Number(number) => number.to_string(),
        }
    }
}

/// Request to cast a vote.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    pub option_id: Option<i64>,
    #[serde(default)]
    pub value: Option<VoteValue>,
}

impl From<VoteRequest> for VoteSubmission {
    fn from(req: VoteRequest) -> Self {
        VoteSubmission {
            option_id: req.option_id.map(OptionId::new),
            numeric: matches!(req.value, Some(VoteValue::Number(_))),
            value: req.value.map(VoteValue::into_text),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response for poll creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePollResponse {
    pub message: String,
    pub poll_id: i64,
}

/// Option as shown to voters.
#[derive(Debug, Clone, Serialize)]
pub struct OptionResponse {
    pub id: i64,
    pub text: String,
}

/// Poll with its options.
#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub id: i64,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: PollKind,
    pub options: Vec<OptionResponse>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Poll> for PollResponse {
    fn from(poll: Poll) -> Self {
        Self {
            id: poll.id.value(),
            question: poll.question,
            kind: poll.kind,
            options: poll
                .options
                .into_iter()
                .map(|o| OptionResponse {
                    id: o.id.value(),
                    text: o.text,
                })
                .collect(),
            is_active: poll.is_active,
            created_at: poll.created_at.to_rfc3339(),
        }
    }
}

/// Poll list, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct PollListResponse {
    pub polls: Vec<PollResponse>,
    pub total: usize,
}

impl From<Vec<Poll>> for PollListResponse {
    fn from(polls: Vec<Poll>) -> Self {
        let polls: Vec<PollResponse> = polls.into_iter().map(PollResponse::from).collect();
        Self {
            total: polls.len(),
            polls,
        }
    }
}

/// Response for an accepted vote.
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub message: String,
    pub vote_id: String,
    pub poll_id: i64,
}

impl From<Vote> for VoteResponse {
    fn from(vote: Vote) -> Self {
        Self {
            message: "Vote recorded".to_string(),
            vote_id: vote.id.to_string(),
            poll_id: vote.poll_id.value(),
        }
    }
}

/// Generic command acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPayload, message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new(
            ErrorCode::PollNotFound,
            format!("{} not found: {}", resource_type, id),
        )
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_request_accepts_numeric_rating() {
        let req: VoteRequest = serde_json::from_str(r#"{"value": 4}"#).unwrap();
        let submission = VoteSubmission::from(req);
        assert_eq!(submission.value.as_deref(), Some("4"));
        assert!(submission.numeric);
        assert_eq!(submission.option_id, None);
    }

    #[test]
    fn vote_request_keeps_text_values_textual() {
        let req: VoteRequest = serde_json::from_str(r#"{"value": "42"}"#).unwrap();
        let submission = VoteSubmission::from(req);
        assert_eq!(submission.value.as_deref(), Some("42"));
        assert!(!submission.numeric);
    }

    #[test]
    fn vote_request_accepts_option_id() {
        let req: VoteRequest = serde_json::from_str(r#"{"option_id": 12}"#).unwrap();
        let submission = VoteSubmission::from(req);
        assert_eq!(submission.option_id, Some(OptionId::new(12)));
    }

    #[test]
    fn create_request_reads_wire_kind_names() {
        let req: CreatePollRequest = serde_json::from_str(
            r#"{"question": "Best?", "type": "multiple_choice", "options": ["A", "B"]}"#,
        )
        .unwrap();
        assert_eq!(req.kind, PollKind::SingleChoice);
        assert_eq!(req.options.len(), 2);
    }

    #[test]
    fn create_request_options_default_to_empty() {
        let req: CreatePollRequest =
            serde_json::from_str(r#"{"question": "Rate", "type": "rating"}"#).unwrap();
        assert!(req.options.is_empty());
    }

    #[test]
    fn error_response_uses_screaming_codes() {
        let error = ErrorResponse::not_found("Poll", "9");
        assert_eq!(error.code, "POLL_NOT_FOUND");
        assert!(error.message.contains("9"));

        let json = serde_json::to_value(ErrorResponse::bad_request("bad")).unwrap();
        assert_eq!(json["code"], "INVALID_PAYLOAD");
        assert!(json.get("details").is_none());
    }
}
