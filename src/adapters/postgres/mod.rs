//! PostgreSQL adapters - Database implementations for the catalog and ledger ports.
//!
//! - `PostgresPollStore` - Poll catalog with transactional creation
//! - `PostgresVoteLedger` - Append-only vote ledger ordered by sequence

mod poll_store;
mod vote_ledger;

pub use poll_store::PostgresPollStore;
pub use vote_ledger::PostgresVoteLedger;
