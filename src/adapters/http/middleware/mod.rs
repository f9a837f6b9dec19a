//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token middleware and the auth/admin extractors

pub mod auth;

pub use auth::{auth_middleware, AuthRejection, AuthState, OptionalAuth, RequireAdmin, RequireAuth};
