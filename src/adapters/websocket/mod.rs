//! WebSocket adapter for live poll results.
//!
//! # Architecture
//!
//! ```text
//!  vote ─▶ BroadcastCoordinator ─▶ Connection (latest per poll)
//!                                        │
//!  client ◀── send task ◀── next_update ─┘
//!  client ──▶ recv task ──▶ join_poll / leave_poll / ping
//!                               │
//!                               └─▶ SubscriptionRegistry
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;

pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{ClientMessage, ConnectedMessage, ErrorMessage, PollRef, ServerMessage};
