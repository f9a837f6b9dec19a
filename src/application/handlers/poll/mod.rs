//! Poll command and query handlers.

mod close_poll;
mod create_poll;
mod get_poll;
mod get_results;
mod list_polls;
mod submit_vote;

pub use close_poll::{ClosePollCommand, ClosePollHandler};
pub use create_poll::{CreatePollCommand, CreatePollHandler};
pub use get_poll::{GetPollHandler, GetPollQuery};
pub use get_results::GetResultsHandler;
pub use list_polls::ListPollsHandler;
pub use submit_vote::{SubmitVoteCommand, SubmitVoteHandler};
