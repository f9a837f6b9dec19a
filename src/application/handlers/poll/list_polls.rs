//! ListPollsHandler - Query handler for the poll listing.

use std::sync::Arc;

use crate::domain::poll::{Poll, PollError};
use crate::ports::PollCatalog;

/// Handler listing every poll, newest first.
pub struct ListPollsHandler {
    catalog: Arc<dyn PollCatalog>,
}

impl ListPollsHandler {
    pub fn new(catalog: Arc<dyn PollCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self) -> Result<Vec<Poll>, PollError> {
        Ok(self.catalog.list_polls().await?)
    }
}
