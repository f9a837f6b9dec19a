//! GetResultsHandler - Query handler computing a poll's aggregate.
//!
//! Reads the ledger in full and hands it to the pure aggregator; nothing is
//! cached, so the answer always matches a fresh recompute.

use std::sync::Arc;

use crate::domain::foundation::PollId;
use crate::domain::poll::{compute_results, PollError, PollResults};
use crate::ports::{PollCatalog, VoteLedger};

/// Handler for results queries. Also drives broadcast recomputes.
#[derive(Clone)]
pub struct GetResultsHandler {
    catalog: Arc<dyn PollCatalog>,
    ledger: Arc<dyn VoteLedger>,
}

impl GetResultsHandler {
    pub fn new(catalog: Arc<dyn PollCatalog>, ledger: Arc<dyn VoteLedger>) -> Self {
        Self { catalog, ledger }
    }

    /// Aggregate for `poll_id` over every vote currently in the ledger.
    ///
    /// # Errors
    ///
    /// `PollError::NotFound` when the poll does not exist; infrastructure
    /// errors from the stores otherwise.
    pub async fn handle(&self, poll_id: PollId) -> Result<PollResults, PollError> {
        let poll = self
            .catalog
            .get_poll(poll_id)
            .await?
            .ok_or(PollError::NotFound(poll_id))?;

        let votes = self.ledger.votes_for(poll_id).await?;
        Ok(compute_results(&poll, &votes))
    }

    /// Whether `poll_id` names a poll, without reading its votes.
    pub async fn exists(&self, poll_id: PollId) -> Result<bool, PollError> {
        Ok(self.catalog.get_poll(poll_id).await?.is_some())
    }
}
