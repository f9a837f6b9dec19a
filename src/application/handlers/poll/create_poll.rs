//! CreatePollHandler - Command handler for adding a poll to the catalog.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::poll::{NewPoll, Poll, PollError, PollKind, PollLimits};
use crate::ports::PollRepository;

/// Command to create a new poll.
///
/// Admin capability is checked by the caller before this command is built.
#[derive(Debug, Clone)]
pub struct CreatePollCommand {
    pub question: String,
    pub kind: PollKind,
    pub options: Vec<String>,
    pub created_by: Option<UserId>,
}

/// Handler for creating polls.
pub struct CreatePollHandler {
    repository: Arc<dyn PollRepository>,
    limits: PollLimits,
}

impl CreatePollHandler {
    pub fn new(repository: Arc<dyn PollRepository>, limits: PollLimits) -> Self {
        Self { repository, limits }
    }

    pub async fn handle(&self, cmd: CreatePollCommand) -> Result<Poll, PollError> {
        let draft = NewPoll::draft(
            cmd.question,
            cmd.kind,
            cmd.options,
            cmd.created_by,
            &self.limits,
        )?;

        let poll = self.repository.create(draft).await?;

        tracing::info!(
            poll_id = %poll.id,
            kind = %poll.kind,
            options = poll.options.len(),
            "Poll created"
        );

        Ok(poll)
    }
}
