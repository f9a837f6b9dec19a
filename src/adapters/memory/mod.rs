//! In-memory adapters for the catalog and ledger ports.
//!
//! The default backing when no database is configured, and the fixture
//! for tests.

mod poll_store;
mod vote_ledger;

pub use poll_store::InMemoryPollStore;
pub use vote_ledger::InMemoryVoteLedger;
