//! Pollcast - Live Polling Backend
//!
//! Collects votes on polls of several kinds, aggregates them into
//! kind-shaped results, and pushes fresh results to every live viewer of
//! a poll over WebSocket, coalescing bursts so no viewer ever sees an
//! older result after a newer one.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
