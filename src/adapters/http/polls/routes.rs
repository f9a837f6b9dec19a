//! HTTP routes for poll endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    close_poll, create_poll, get_poll, get_results, list_polls, submit_vote, PollHandlers,
};

/// Creates the poll router with all endpoints.
pub fn poll_routes(handlers: PollHandlers) -> Router {
    Router::new()
        .route("/", post(create_poll).get(list_polls))
        .route("/:id", get(get_poll))
        .route("/:id/close", post(close_poll))
        .route("/:id/vote", post(submit_vote))
        .route("/:id/results", get(get_results))
        .with_state(handlers)
}
