//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PollCatalog` / `PollRepository` - Poll storage (read / admin write)
//! - `VoteLedger` - Append-only vote records
//! - `VoteObserver` - Hook fired after each ledgered vote
//! - `SessionValidator` - Token to identity resolution

mod poll_catalog;
mod session_validator;
mod vote_ledger;
mod vote_observer;

pub use poll_catalog::{PollCatalog, PollRepository};
pub use session_validator::SessionValidator;
pub use vote_ledger::VoteLedger;
pub use vote_observer::VoteObserver;
