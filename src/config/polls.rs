//! Poll and vote limits

use serde::Deserialize;

use crate::domain::poll::{PollLimits, VoteRules};

use super::error::ValidationError;

/// Acceptance limits for polls and votes
#[derive(Debug, Clone, Deserialize)]
pub struct PollsConfig {
    /// Lowest accepted rating
    #[serde(default = "default_rating_min")]
    pub rating_min: i64,

    /// Highest accepted rating
    #[serde(default = "default_rating_max")]
    pub rating_max: i64,

    /// Longest accepted free-form value, question, or option text
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,

    /// Most options a poll may have
    #[serde(default = "default_max_options")]
    pub max_options: usize,

    /// Per-connection queue for direct WebSocket replies
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl PollsConfig {
    pub fn vote_rules(&self) -> VoteRules {
        VoteRules {
            rating_min: self.rating_min,
            rating_max: self.rating_max,
            max_value_length: self.max_value_length,
        }
    }

    pub fn poll_limits(&self) -> PollLimits {
        PollLimits {
            max_options: self.max_options,
            max_text_length: self.max_value_length,
        }
    }

    /// Validate limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rating_min > self.rating_max {
            return Err(ValidationError::InvalidRatingRange {
                min: self.rating_min,
                max: self.rating_max,
            });
        }
        if self.max_value_length == 0 {
            return Err(ValidationError::ZeroLimit("max_value_length"));
        }
        if self.max_options == 0 {
            return Err(ValidationError::ZeroLimit("max_options"));
        }
        if self.subscriber_buffer == 0 {
            return Err(ValidationError::ZeroLimit("subscriber_buffer"));
        }
        Ok(())
    }
}

impl Default for PollsConfig {
    fn default() -> Self {
        Self {
            rating_min: default_rating_min(),
            rating_max: default_rating_max(),
            max_value_length: default_max_value_length(),
            max_options: default_max_options(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

fn default_rating_min() -> i64 {
    1
}

fn default_rating_max() -> i64 {
    5
}

fn default_max_value_length() -> usize {
    255
}

fn default_max_options() -> usize {
    50
}

fn default_subscriber_buffer() -> usize {
    32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_domain_defaults() {
        let config = PollsConfig::default();
        assert_eq!(config.vote_rules(), VoteRules::default());
        assert_eq!(config.poll_limits().max_options, PollLimits::default().max_options);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_rating_range() {
        let config = PollsConfig {
            rating_min: 10,
            rating_max: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRatingRange { min: 10, max: 1 })
        ));
    }

    #[test]
    fn rejects_zero_limits() {
        let config = PollsConfig {
            subscriber_buffer: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ZeroLimit("subscriber_buffer"))
        ));
    }
}
