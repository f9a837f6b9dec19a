//! In-memory poll catalog.
//!
//! Assigns sequential poll and option ids, so option ids ascend in
//! creation order exactly as the database adapter's serial columns do.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OptionId, PollId, Timestamp};
use crate::domain::poll::{NewPoll, Poll, PollOption};
use crate::ports::{PollCatalog, PollRepository};

#[derive(Debug, Default)]
struct Catalog {
    polls: BTreeMap<PollId, Poll>,
    last_poll_id: i64,
    last_option_id: i64,
}

/// In-memory storage for polls and options.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPollStore {
    inner: Arc<RwLock<Catalog>>,
}

impl InMemoryPollStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored polls.
    pub async fn poll_count(&self) -> usize {
        self.inner.read().await.polls.len()
    }
}

#[async_trait]
impl PollCatalog for InMemoryPollStore {
    async fn get_poll(&self, id: PollId) -> Result<Option<Poll>, DomainError> {
        Ok(self.inner.read().await.polls.get(&id).cloned())
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, DomainError> {
        Ok(self.inner.read().await.polls.values().rev().cloned().collect())
    }
}

#[async_trait]
impl PollRepository for InMemoryPollStore {
    async fn create(&self, draft: NewPoll) -> Result<Poll, DomainError> {
        let mut catalog = self.inner.write().await;

        catalog.last_poll_id += 1;
        let poll_id = PollId::new(catalog.last_poll_id);

        let mut options = Vec::with_capacity(draft.option_texts.len());
        for text in draft.option_texts {
            catalog.last_option_id += 1;
            options.push(PollOption {
                id: OptionId::new(catalog.last_option_id),
                text,
                poll_id,
            });
        }

        let poll = Poll {
            id: poll_id,
            question: draft.question,
            kind: draft.kind,
            options,
            is_active: true,
            created_by: draft.created_by,
            created_at: Timestamp::now(),
        };
        catalog.polls.insert(poll_id, poll.clone());
        Ok(poll)
    }

    async fn set_active(&self, id: PollId, active: bool) -> Result<bool, DomainError> {
        let mut catalog = self.inner.write().await;
        match catalog.polls.get_mut(&id) {
            Some(poll) => {
                poll.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
