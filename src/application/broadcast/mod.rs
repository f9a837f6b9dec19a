//! Live results broadcast.
//!
//! - `Connection` - Per-subscriber latest-value slot per poll
//! - `SubscriptionRegistry` - Connection to poll interest
//! - `BroadcastCoordinator` - Coalescing recompute-and-deliver on each vote

mod connection;
mod coordinator;
mod registry;

pub use connection::{Connection, ConnectionId, ConnectionReceiver, DeliveryError};
pub use coordinator::BroadcastCoordinator;
pub use registry::SubscriptionRegistry;
