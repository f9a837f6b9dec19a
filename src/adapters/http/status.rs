//! Liveness and caller-identity endpoints.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::middleware::OptionalAuth;

/// Response for `GET /api/auth/status`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// GET /api/auth/status - Who the bearer token belongs to, if anyone
pub async fn auth_status(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let response = match user {
        Some(user) => AuthStatusResponse {
            authenticated: true,
            is_admin: Some(user.is_admin),
            username: Some(user.username),
        },
        None => AuthStatusResponse {
            authenticated: false,
            is_admin: None,
            username: None,
        },
    };
    (StatusCode::OK, Json(response))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

pub fn status_routes() -> Router {
    Router::new()
        .route("/api/auth/status", get(auth_status))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_status_omits_identity_fields() {
        let json = serde_json::to_value(AuthStatusResponse {
            authenticated: false,
            is_admin: None,
            username: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "authenticated": false }));
    }
}
