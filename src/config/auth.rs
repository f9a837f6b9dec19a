//! Authentication configuration
//!
//! Tokens are granted out of band, comma-separated:
//!
//! ```text
//! POLLCAST__AUTH__TOKENS=s3cret:alice:admin,v0ter:bob
//! ```

use serde::Deserialize;

use crate::adapters::auth::StaticTokenValidator;

use super::error::ValidationError;

/// Static token grants
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// `token:user_id[:admin]` entries (comma-separated)
    pub tokens: Option<String>,
}

impl AuthConfig {
    /// Get token entries as a vector
    pub fn tokens_list(&self) -> Vec<String> {
        self.tokens
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Build the session validator for these grants.
    pub fn validator(&self) -> Result<StaticTokenValidator, ValidationError> {
        StaticTokenValidator::from_entries(&self.tokens_list())
            .map_err(|e| ValidationError::InvalidTokenEntry(e.to_string()))
    }

    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validator().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tokens_means_anonymous_only() {
        let config = AuthConfig::default();
        assert!(config.tokens_list().is_empty());
        assert!(config.validator().unwrap().is_empty());
    }

    #[test]
    fn parses_comma_separated_entries() {
        let config = AuthConfig {
            tokens: Some("a:alice:admin, b:bob ,".to_string()),
        };
        assert_eq!(config.tokens_list(), vec!["a:alice:admin", "b:bob"]);
        assert_eq!(config.validator().unwrap().len(), 2);
    }

    #[test]
    fn malformed_entry_fails_validation() {
        let config = AuthConfig {
            tokens: Some("a:alice:superuser".to_string()),
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTokenEntry(_))
        ));
    }
}
