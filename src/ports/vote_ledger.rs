//! VoteLedger port - append-only system of record for votes.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PollId};
use crate::domain::poll::Vote;

/// Append-only store of vote records per poll.
///
/// # Contract
///
/// - Appends are atomic per record; readers never see a partial vote.
/// - Within one poll, `votes_for` returns votes in append order.
/// - Entries are never overwritten or removed.
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Append a vote. Returns the poll's ledger length after the append.
    async fn append(&self, vote: Vote) -> Result<u64, DomainError>;

    /// All votes for a poll, in append order.
    async fn votes_for(&self, poll_id: PollId) -> Result<Vec<Vote>, DomainError>;

    /// Number of votes recorded for a poll.
    async fn count(&self, poll_id: PollId) -> Result<u64, DomainError>;
}
