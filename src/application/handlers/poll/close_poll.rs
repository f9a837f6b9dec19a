//! ClosePollHandler - Command handler for deactivating a poll.

use std::sync::Arc;

use crate::domain::foundation::PollId;
use crate::domain::poll::PollError;
use crate::ports::PollRepository;

/// Command to stop a poll from accepting votes.
#[derive(Debug, Clone, Copy)]
pub struct ClosePollCommand {
    pub poll_id: PollId,
}

/// Handler for closing polls.
pub struct ClosePollHandler {
    repository: Arc<dyn PollRepository>,
}

impl ClosePollHandler {
    pub fn new(repository: Arc<dyn PollRepository>) -> Self {
        Self { repository }
    }

    /// Closing an already closed poll succeeds.
    pub async fn handle(&self, cmd: ClosePollCommand) -> Result<(), PollError> {
        if !self.repository.set_active(cmd.poll_id, false).await? {
            return Err(PollError::NotFound(cmd.poll_id));
        }

        tracing::info!(poll_id = %cmd.poll_id, "Poll closed");
        Ok(())
    }
}
