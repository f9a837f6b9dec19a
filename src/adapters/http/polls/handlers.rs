//! HTTP handlers for poll endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::{OptionalAuth, RequireAdmin};
use crate::application::handlers::poll::{
    ClosePollCommand, ClosePollHandler, CreatePollCommand, CreatePollHandler, GetPollHandler,
    GetPollQuery, GetResultsHandler, ListPollsHandler, SubmitVoteCommand, SubmitVoteHandler,
};
use crate::domain::foundation::{ErrorCode, PollId};
use crate::domain::poll::{PollError, VoteError};

use super::dto::{
    CreatePollRequest, CreatePollResponse, ErrorResponse, MessageResponse, PollListResponse,
    PollResponse, VoteRequest, VoteResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct PollHandlers {
    create_handler: Arc<CreatePollHandler>,
    close_handler: Arc<ClosePollHandler>,
    get_handler: Arc<GetPollHandler>,
    list_handler: Arc<ListPollsHandler>,
    vote_handler: Arc<SubmitVoteHandler>,
    results_handler: Arc<GetResultsHandler>,
}

impl PollHandlers {
    pub fn new(
        create_handler: Arc<CreatePollHandler>,
        close_handler: Arc<ClosePollHandler>,
        get_handler: Arc<GetPollHandler>,
        list_handler: Arc<ListPollsHandler>,
        vote_handler: Arc<SubmitVoteHandler>,
        results_handler: Arc<GetResultsHandler>,
    ) -> Self {
        Self {
            create_handler,
            close_handler,
            get_handler,
            list_handler,
            vote_handler,
            results_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/polls - Create a poll (admin only)
pub async fn create_poll(
    State(handlers): State<PollHandlers>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreatePollRequest>,
) -> Response {
    let cmd = CreatePollCommand {
        question: req.question,
        kind: req.kind,
        options: req.options,
        created_by: Some(admin.id),
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(poll) => {
            let response = CreatePollResponse {
                message: "Poll created".to_string(),
                poll_id: poll.id.value(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_poll_error(e),
    }
}

/// GET /api/polls - List polls, newest first
pub async fn list_polls(State(handlers): State<PollHandlers>) -> Response {
    match handlers.list_handler.handle().await {
        Ok(polls) => (StatusCode::OK, Json(PollListResponse::from(polls))).into_response(),
        Err(e) => handle_poll_error(e),
    }
}

/// GET /api/polls/:id - Poll details with options
pub async fn get_poll(
    State(handlers): State<PollHandlers>,
    Path(poll_id): Path<String>,
) -> Response {
    let poll_id = match parse_poll_id(&poll_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.get_handler.handle(GetPollQuery { poll_id }).await {
        Ok(poll) => (StatusCode::OK, Json(PollResponse::from(poll))).into_response(),
        Err(e) => handle_poll_error(e),
    }
}

/// POST /api/polls/:id/close - Stop accepting votes (admin only)
pub async fn close_poll(
    State(handlers): State<PollHandlers>,
    RequireAdmin(_admin): RequireAdmin,
    Path(poll_id): Path<String>,
) -> Response {
    let poll_id = match parse_poll_id(&poll_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.close_handler.handle(ClosePollCommand { poll_id }).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Poll closed".to_string(),
            }),
        )
            .into_response(),
        Err(e) => handle_poll_error(e),
    }
}

/// POST /api/polls/:id/vote - Cast a vote (anonymous allowed)
pub async fn submit_vote(
    State(handlers): State<PollHandlers>,
    OptionalAuth(user): OptionalAuth,
    Path(poll_id): Path<String>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Response {
    let poll_id = match parse_poll_id(&poll_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_vote(rejection),
    };

    let cmd = SubmitVoteCommand {
        poll_id,
        submission: req.into(),
        voter_id: user.map(|u| u.id),
    };

    match handlers.vote_handler.handle(cmd).await {
        Ok(vote) => (StatusCode::OK, Json(VoteResponse::from(vote))).into_response(),
        Err(e) => handle_vote_error(e),
    }
}

/// GET /api/polls/:id/results - Current aggregate
pub async fn get_results(
    State(handlers): State<PollHandlers>,
    Path(poll_id): Path<String>,
) -> Response {
    let poll_id = match parse_poll_id(&poll_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.results_handler.handle(poll_id).await {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => handle_poll_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

fn parse_poll_id(raw: &str) -> Result<PollId, Response> {
    raw.parse::<PollId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid poll ID")),
        )
            .into_response()
    })
}

/// A body that does not deserialize is a payload shape mismatch.
fn malformed_vote(rejection: JsonRejection) -> Response {
    tracing::debug!("Malformed vote body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(format!(
            "Invalid vote: {}",
            rejection.body_text()
        ))),
    )
        .into_response()
}

fn handle_poll_error(error: PollError) -> Response {
    match error {
        PollError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Poll", &id.to_string())),
        )
            .into_response(),
        PollError::ValidationFailed { field, message } => (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::new(ErrorCode::ValidationFailed, message)
                    .with_details(serde_json::json!({ "field": field })),
            ),
        )
            .into_response(),
        PollError::Infrastructure(msg) => {
            tracing::error!("Poll operation failed: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Internal server error")),
            )
                .into_response()
        }
    }
}

fn handle_vote_error(error: VoteError) -> Response {
    let status = match &error {
        VoteError::NotFound(_) => StatusCode::NOT_FOUND,
        VoteError::Inactive(_) => StatusCode::CONFLICT,
        VoteError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        VoteError::OutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        VoteError::Infrastructure(msg) => {
            tracing::error!("Vote submission failed: {}", msg);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Internal server error")),
            )
                .into_response();
        }
    };

    let mut body = ErrorResponse::new(error.code(), error.to_string());
    if let VoteError::OutOfRange { min, max, .. } = error {
        body = body.with_details(serde_json::json!({ "min": min, "max": max }));
    }
    (status, Json(body)).into_response()
}
