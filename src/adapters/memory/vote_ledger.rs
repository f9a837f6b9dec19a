//! In-memory vote ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PollId};
use crate::domain::poll::Vote;
use crate::ports::VoteLedger;

/// Append-only per-poll vote lists behind a single lock.
///
/// Each append takes the write lock once, so readers see either the whole
/// record or none of it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVoteLedger {
    votes: Arc<RwLock<HashMap<PollId, Vec<Vote>>>>,
}

impl InMemoryVoteLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteLedger for InMemoryVoteLedger {
    async fn append(&self, vote: Vote) -> Result<u64, DomainError> {
        let mut votes = self.votes.write().await;
        let entries = votes.entry(vote.poll_id).or_default();
        entries.push(vote);
        Ok(entries.len() as u64)
    }

    async fn votes_for(&self, poll_id: PollId) -> Result<Vec<Vote>, DomainError> {
        Ok(self
            .votes
            .read()
            .await
            .get(&poll_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count(&self, poll_id: PollId) -> Result<u64, DomainError> {
        Ok(self
            .votes
            .read()
            .await
            .get(&poll_id)
            .map(|v| v.len() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::poll::VoteChoice;

    fn text_vote(poll: i64, value: &str) -> Vote {
        Vote::new(PollId::new(poll), VoteChoice::Value(value.to_string()), None)
    }

    #[tokio::test]
    async fn append_preserves_order_and_reports_length() {
        let ledger = InMemoryVoteLedger::new();
        assert_eq!(ledger.append(text_vote(1, "first")).await.unwrap(), 1);
        assert_eq!(ledger.append(text_vote(1, "second")).await.unwrap(), 2);

        let values: Vec<String> = ledger
            .votes_for(PollId::new(1))
            .await
            .unwrap()
            .iter()
            .filter_map(|v| v.value().map(str::to_string))
            .collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn polls_are_kept_apart() {
        let ledger = InMemoryVoteLedger::new();
        ledger.append(text_vote(1, "a")).await.unwrap();
        ledger.append(text_vote(2, "b")).await.unwrap();

        assert_eq!(ledger.count(PollId::new(1)).await.unwrap(), 1);
        assert_eq!(ledger.count(PollId::new(2)).await.unwrap(), 1);
        assert_eq!(ledger.count(PollId::new(3)).await.unwrap(), 0);
        assert!(ledger.votes_for(PollId::new(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_recorded() {
        let ledger = InMemoryVoteLedger::new();
        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.append(text_vote(1, &i.to_string())).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(ledger.count(PollId::new(1)).await.unwrap(), 50);
    }
}
