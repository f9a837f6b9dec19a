//! VoteObserver port - notified after each successfully ledgered vote.

use crate::domain::poll::Vote;

/// Receives exactly one notification per ledgered vote.
///
/// Implementations must return promptly: the call sits on the vote
/// submission path, so any recompute or delivery work is scheduled, not
/// awaited.
pub trait VoteObserver: Send + Sync {
    fn on_vote_accepted(&self, vote: &Vote);
}
