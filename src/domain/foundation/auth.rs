//! Authentication types for the domain layer.
//!
//! An `AuthenticatedUser` is whatever the identity provider vouches for.
//! The core trusts it as given; admin rights come only from the provider
//! (see `adapters::auth`), never from anything the user submits.

use super::UserId;
use thiserror::Error;

/// Authenticated caller extracted from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the identity provider.
    pub id: UserId,

    /// Human-readable name shown in status responses.
    pub username: String,

    /// Whether this user may create and close polls.
    pub is_admin: bool,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            username: username.into(),
            is_admin,
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or unknown.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Caller is authenticated but lacks the admin capability.
    #[error("Admin login required")]
    AdminRequired,

    /// The identity provider is unavailable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
