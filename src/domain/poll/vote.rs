//! Vote records and submission validation.

use std::num::IntErrorKind;

use serde::Serialize;

use crate::domain::foundation::{OptionId, PollId, Timestamp, UserId, VoteId};

use super::errors::VoteError;
use super::model::{Poll, PollKind};

/// What a vote carries. Exactly one of option or value, fixed by poll kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Option(OptionId),
    Value(String),
}

/// One participant's response, as recorded in the ledger. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub poll_id: PollId,
    pub choice: VoteChoice,
    /// Absent for anonymous votes. Advisory only, not a uniqueness key.
    pub voter_id: Option<UserId>,
    pub cast_at: Timestamp,
}

impl Vote {
    pub fn new(poll_id: PollId, choice: VoteChoice, voter_id: Option<UserId>) -> Self {
        Self {
            id: VoteId::new(),
            poll_id,
            choice,
            voter_id,
            cast_at: Timestamp::now(),
        }
    }

    pub fn option_id(&self) -> Option<OptionId> {
        match &self.choice {
            VoteChoice::Option(id) => Some(*id),
            VoteChoice::Value(_) => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match &self.choice {
            VoteChoice::Option(_) => None,
            VoteChoice::Value(v) => Some(v),
        }
    }
}

/// Raw payload as received from a voter, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteSubmission {
    pub option_id: Option<OptionId>,
    pub value: Option<String>,
    /// The value arrived as a JSON number. Only rating polls take one.
    pub numeric: bool,
}

impl VoteSubmission {
    pub fn option(id: OptionId) -> Self {
        Self {
            option_id: Some(id),
            ..Self::default()
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// A value sent as a bare number, kept in its textual form.
    pub fn number(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            numeric: true,
            ..Self::default()
        }
    }
}

/// Configured acceptance rules for vote payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRules {
    pub rating_min: i64,
    pub rating_max: i64,
    pub max_value_length: usize,
}

impl Default for VoteRules {
    fn default() -> Self {
        Self {
            rating_min: 1,
            rating_max: 5,
            max_value_length: 255,
        }
    }
}

impl VoteRules {
    /// Validates a submission against a poll and yields the choice to record.
    ///
    /// Checks run in order: poll active, payload shape, rating range.
    pub fn validate(
        &self,
        poll: &Poll,
        submission: VoteSubmission,
    ) -> Result<VoteChoice, VoteError> {
        if !poll.is_active {
            return Err(VoteError::Inactive(poll.id));
        }

        if poll.kind.is_option_bearing() {
            if submission.value.is_some() {
                return Err(VoteError::invalid_payload(format!(
                    "{} polls take an option_id, not a value",
                    poll.kind
                )));
            }
            let option_id = submission
                .option_id
                .ok_or_else(|| VoteError::invalid_payload("Option ID required"))?;
            if poll.option(option_id).is_none() {
                return Err(VoteError::invalid_payload(format!(
                    "Option {} does not belong to poll {}",
                    option_id, poll.id
                )));
            }
            return Ok(VoteChoice::Option(option_id));
        }

        if submission.option_id.is_some() {
            return Err(VoteError::invalid_payload(format!(
                "{} polls take a value, not an option_id",
                poll.kind
            )));
        }
        if submission.numeric && poll.kind != PollKind::Rating {
            return Err(VoteError::invalid_payload(format!(
                "{} polls take a text value, not a number",
                poll.kind
            )));
        }
        let value = submission
            .value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| VoteError::invalid_payload("Value required"))?;
        if value.chars().count() > self.max_value_length {
            return Err(VoteError::invalid_payload(format!(
                "Value longer than {} characters",
                self.max_value_length
            )));
        }

        match poll.kind {
            PollKind::Rating => {
                let rating: i64 = match value.trim().parse::<i64>() {
                    Ok(rating) => rating,
                    Err(e) => {
                        let saturated = match e.kind() {
                            IntErrorKind::PosOverflow => i64::MAX,
                            IntErrorKind::NegOverflow => i64::MIN,
                            _ => {
                                return Err(VoteError::invalid_payload(format!(
                                    "Rating '{}' is not an integer",
                                    value
                                )))
                            }
                        };
                        return Err(VoteError::OutOfRange {
                            value: saturated,
                            min: self.rating_min,
                            max: self.rating_max,
                        });
                    }
                };
                if rating < self.rating_min || rating > self.rating_max {
                    return Err(VoteError::OutOfRange {
                        value: rating,
                        min: self.rating_min,
                        max: self.rating_max,
                    });
                }
                Ok(VoteChoice::Value(rating.to_string()))
            }
            _ => Ok(VoteChoice::Value(value)),
        }
    }
}
