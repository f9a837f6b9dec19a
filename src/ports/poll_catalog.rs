//! Poll catalog ports.
//!
//! `PollCatalog` is the read side the core consumes; `PollRepository` is
//! the write side used only by admin operations.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PollId};
use crate::domain::poll::{NewPoll, Poll, PollOption};

/// Read access to polls and their options.
#[async_trait]
pub trait PollCatalog: Send + Sync {
    /// Fetch a poll with its options, or `None` if absent.
    async fn get_poll(&self, id: PollId) -> Result<Option<Poll>, DomainError>;

    /// All polls, newest first.
    async fn list_polls(&self) -> Result<Vec<Poll>, DomainError>;

    /// Options of a poll in ascending id order; empty if the poll is absent.
    async fn get_options(&self, poll_id: PollId) -> Result<Vec<PollOption>, DomainError> {
        Ok(self
            .get_poll(poll_id)
            .await?
            .map(|poll| poll.options)
            .unwrap_or_default())
    }

    /// Whether the poll exists and accepts votes.
    async fn is_active(&self, poll_id: PollId) -> Result<bool, DomainError> {
        Ok(self
            .get_poll(poll_id)
            .await?
            .map(|poll| poll.is_active)
            .unwrap_or(false))
    }
}

/// Write access to the catalog.
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Persist a drafted poll, assigning poll and option ids.
    ///
    /// Option ids must be strictly ascending in draft order.
    async fn create(&self, draft: NewPoll) -> Result<Poll, DomainError>;

    /// Set the active flag. Returns `false` if the poll does not exist.
    async fn set_active(&self, id: PollId, active: bool) -> Result<bool, DomainError>;
}
