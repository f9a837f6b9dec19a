//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session validators (static token table, mock)
//! - `http` - REST API, auth middleware, status routes
//! - `memory` - In-memory catalog and ledger
//! - `postgres` - PostgreSQL catalog and ledger
//! - `websocket` - Live results subscriptions

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
