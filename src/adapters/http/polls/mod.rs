//! HTTP adapter for poll endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreatePollRequest, CreatePollResponse, ErrorResponse, MessageResponse, OptionResponse,
    PollListResponse, PollResponse, VoteRequest, VoteResponse, VoteValue,
};
pub use handlers::PollHandlers;
pub use routes::poll_routes;
