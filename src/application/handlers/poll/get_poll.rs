//! GetPollHandler - Query handler for a single poll.

use std::sync::Arc;

use crate::domain::foundation::PollId;
use crate::domain::poll::{Poll, PollError};
use crate::ports::PollCatalog;

/// Query to fetch a poll with its options.
#[derive(Debug, Clone, Copy)]
pub struct GetPollQuery {
    pub poll_id: PollId,
}

/// Handler for poll lookups.
pub struct GetPollHandler {
    catalog: Arc<dyn PollCatalog>,
}

impl GetPollHandler {
    pub fn new(catalog: Arc<dyn PollCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetPollQuery) -> Result<Poll, PollError> {
        self.catalog
            .get_poll(query.poll_id)
            .await?
            .ok_or(PollError::NotFound(query.poll_id))
    }
}
