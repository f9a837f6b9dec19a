//! HTTP adapters - REST API and router composition.
//!
//! ```text
//! /api/polls/...       polls::poll_routes
//! /api/auth/status     status::status_routes
//! /health              status::status_routes
//! /ws                  websocket::websocket_router
//! ```
//!
//! Every route runs behind `auth_middleware`, so handlers see the caller
//! through the `OptionalAuth`/`RequireAdmin` extractors.

pub mod middleware;
pub mod polls;
pub mod status;

pub use polls::{poll_routes, ErrorResponse, PollHandlers};
pub use status::status_routes;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, WebSocketState};

use middleware::{auth_middleware, AuthState};

/// Assemble the full API router.
pub fn api_router(polls: PollHandlers, websocket: WebSocketState, auth: AuthState) -> Router {
    Router::new()
        .nest("/api/polls", poll_routes(polls))
        .merge(status_routes())
        .merge(websocket_router(websocket))
        .layer(axum::middleware::from_fn_with_state(auth, auth_middleware))
        .layer(TraceLayer::new_for_http())
}
