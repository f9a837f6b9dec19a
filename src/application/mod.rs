//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (create, close, vote) are kept apart from query
//! handlers (get, list, results); `broadcast` pushes results to live
//! subscribers after each vote.

pub mod broadcast;
pub mod handlers;

pub use broadcast::{BroadcastCoordinator, Connection, ConnectionId, SubscriptionRegistry};
pub use handlers::poll::{
    ClosePollCommand, ClosePollHandler, CreatePollCommand, CreatePollHandler, GetPollHandler,
    GetPollQuery, GetResultsHandler, ListPollsHandler, SubmitVoteCommand, SubmitVoteHandler,
};
