//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `poll` - Polls, votes, validation, and results aggregation

pub mod foundation;
pub mod poll;
