//! Static token validator.
//!
//! Tokens are granted out of band through configuration, one entry per
//! token in the form `token:user_id` or `token:user_id:admin`. Nothing a
//! caller submits can mark them as an admin.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId, ValidationError};
use crate::ports::SessionValidator;

const ADMIN_MARKER: &str = "admin";

/// Session validator backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, AuthenticatedUser>,
}

impl StaticTokenValidator {
    /// Build a validator from `token:user_id[:admin]` entries.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` on the first malformed or duplicate entry.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self, ValidationError> {
        let mut tokens = HashMap::with_capacity(entries.len());
        for entry in entries {
            let (token, user) = parse_entry(entry.as_ref())?;
            if tokens.insert(token, user).is_some() {
                return Err(ValidationError::invalid_format(
                    "auth.tokens",
                    "duplicate token",
                ));
            }
        }
        Ok(Self { tokens })
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when no tokens are configured; every request is anonymous.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn parse_entry(entry: &str) -> Result<(String, AuthenticatedUser), ValidationError> {
    let mut parts = entry.trim().split(':');
    let token = parts.next().unwrap_or_default().trim();
    let user_id = parts.next().unwrap_or_default().trim();
    let flag = parts.next().map(str::trim);

    if token.is_empty() {
        return Err(ValidationError::empty_field("auth.tokens.token"));
    }
    let user_id = UserId::new(user_id)?;

    let is_admin = match flag {
        None => false,
        Some(ADMIN_MARKER) => true,
        Some(other) => {
            return Err(ValidationError::invalid_format(
                "auth.tokens",
                format!("unknown capability '{}'", other),
            ))
        }
    };
    if parts.next().is_some() {
        return Err(ValidationError::invalid_format(
            "auth.tokens",
            "expected token:user_id[:admin]",
        ));
    }

    let user = AuthenticatedUser::new(user_id.clone(), user_id.as_str(), is_admin);
    Ok((token.to_string(), user))
}

#[async_trait]
impl SessionValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
