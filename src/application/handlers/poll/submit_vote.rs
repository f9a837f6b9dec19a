//! SubmitVoteHandler - Command handler for casting a vote.
//!
//! Validation runs against the poll as currently catalogued. Once a vote
//! passes, appending it and notifying the observer run on their own task,
//! so a caller that goes away mid-request cannot leave a validated vote
//! unledgered.

use std::sync::Arc;

use crate::domain::foundation::{PollId, UserId};
use crate::domain::poll::{Vote, VoteError, VoteRules, VoteSubmission};
use crate::ports::{PollCatalog, VoteLedger, VoteObserver};

/// Command to cast one vote.
#[derive(Debug, Clone)]
pub struct SubmitVoteCommand {
    pub poll_id: PollId,
    pub submission: VoteSubmission,
    /// Advisory only; repeat voters are not de-duplicated.
    pub voter_id: Option<UserId>,
}

/// Handler for vote submissions.
pub struct SubmitVoteHandler {
    catalog: Arc<dyn PollCatalog>,
    ledger: Arc<dyn VoteLedger>,
    observer: Arc<dyn VoteObserver>,
    rules: VoteRules,
}

impl SubmitVoteHandler {
    pub fn new(
        catalog: Arc<dyn PollCatalog>,
        ledger: Arc<dyn VoteLedger>,
        observer: Arc<dyn VoteObserver>,
        rules: VoteRules,
    ) -> Self {
        Self {
            catalog,
            ledger,
            observer,
            rules,
        }
    }

    pub async fn handle(&self, cmd: SubmitVoteCommand) -> Result<Vote, VoteError> {
        let poll = self
            .catalog
            .get_poll(cmd.poll_id)
            .await?
            .ok_or(VoteError::NotFound(cmd.poll_id))?;

        let choice = self
            .rules
            .validate(&poll, cmd.submission)
            .inspect_err(|e| {
                tracing::debug!(poll_id = %cmd.poll_id, error = %e, "Vote rejected");
            })?;

        let vote = Vote::new(poll.id, choice, cmd.voter_id);

        let ledger = Arc::clone(&self.ledger);
        let observer = Arc::clone(&self.observer);
        let record = vote.clone();
        let length = tokio::spawn(async move {
            let length = ledger.append(record.clone()).await?;
            observer.on_vote_accepted(&record);
            Ok::<u64, VoteError>(length)
        })
        .await
        .map_err(|e| VoteError::Infrastructure(format!("Vote append task failed: {}", e)))??;

        tracing::debug!(
            poll_id = %vote.poll_id,
            vote_id = %vote.id,
            ledger_length = length,
            "Vote accepted"
        );

        Ok(vote)
    }
}
