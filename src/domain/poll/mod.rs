//! Poll domain module.
//!
//! Polls, votes, vote validation, and the pure results aggregator.
//! Nothing here performs I/O; storage sits behind the ports.

mod aggregator;
mod errors;
mod model;
mod results;
mod vote;

pub use aggregator::compute_results;
pub use errors::{PollError, VoteError};
pub use model::{NewPoll, Poll, PollKind, PollLimits, PollOption};
pub use results::{
    ChoiceTally, OptionCount, PollResults, RatingSummary, ResultsPayload, WordCloudTally,
};
pub use vote::{Vote, VoteChoice, VoteRules, VoteSubmission};
