//! Subscription registry: which connections watch which polls.
//!
//! ```text
//! poll 1 ── conn-a, conn-b
//! poll 2 ── conn-b
//! ```
//!
//! A reverse index from connection to polls makes `unsubscribe_all` on
//! disconnect proportional to that connection's own subscriptions.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::domain::foundation::PollId;

use super::connection::{Connection, ConnectionId};

#[derive(Debug, Default)]
struct Subscriptions {
    by_poll: HashMap<PollId, HashMap<ConnectionId, Connection>>,
    by_connection: HashMap<ConnectionId, HashSet<PollId>>,
}

/// Registry of live subscriptions.
///
/// # Thread Safety
///
/// One `RwLock` guards both indexes so they never disagree. Broadcasts
/// take a read lock only long enough to clone the subscriber list.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    inner: RwLock<Subscriptions>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a poll. Subscribing twice is a no-op.
    ///
    /// Returns `true` if the subscription is new.
    pub async fn subscribe(&self, connection: &Connection, poll_id: PollId) -> bool {
        let mut subs = self.inner.write().await;
        let added = subs
            .by_connection
            .entry(connection.id())
            .or_default()
            .insert(poll_id);
        if added {
            subs.by_poll
                .entry(poll_id)
                .or_default()
                .insert(connection.id(), connection.clone());
        }
        added
    }

    /// Remove one subscription. Returns `true` if it existed.
    pub async fn unsubscribe(&self, connection_id: ConnectionId, poll_id: PollId) -> bool {
        let mut subs = self.inner.write().await;

        let removed = match subs.by_connection.get_mut(&connection_id) {
            Some(polls) => {
                let removed = polls.remove(&poll_id);
                if polls.is_empty() {
                    subs.by_connection.remove(&connection_id);
                }
                removed
            }
            None => false,
        };

        if removed {
            detach(&mut subs.by_poll, poll_id, connection_id);
        }
        removed
    }

    /// Remove every subscription of a connection. Safe to call repeatedly.
    ///
    /// Returns the number of subscriptions removed.
    pub async fn unsubscribe_all(&self, connection_id: ConnectionId) -> usize {
        let mut subs = self.inner.write().await;
        let Some(polls) = subs.by_connection.remove(&connection_id) else {
            return 0;
        };
        for poll_id in &polls {
            detach(&mut subs.by_poll, *poll_id, connection_id);
        }
        polls.len()
    }

    /// Snapshot of the connections subscribed to a poll.
    ///
    /// Later subscribe/unsubscribe calls do not affect a snapshot already
    /// taken.
    pub async fn subscribers_of(&self, poll_id: PollId) -> Vec<Connection> {
        self.inner
            .read()
            .await
            .by_poll
            .get(&poll_id)
            .map(|conns| conns.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of connections subscribed to a poll.
    pub async fn subscriber_count(&self, poll_id: PollId) -> usize {
        self.inner
            .read()
            .await
            .by_poll
            .get(&poll_id)
            .map_or(0, HashMap::len)
    }

    /// Number of connections with at least one subscription.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.by_connection.len()
    }
}

fn detach(
    by_poll: &mut HashMap<PollId, HashMap<ConnectionId, Connection>>,
    poll_id: PollId,
    connection_id: ConnectionId,
) {
    if let Some(conns) = by_poll.get_mut(&poll_id) {
        conns.remove(&connection_id);
        if conns.is_empty() {
            by_poll.remove(&poll_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(id: i64) -> PollId {
        PollId::new(id)
    }

    #[tokio::test]
    async fn subscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let (conn, _rx) = Connection::open();

        assert!(registry.subscribe(&conn, poll(1)).await);
        assert!(!registry.subscribe(&conn, poll(1)).await);

        assert_eq!(registry.subscribers_of(poll(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn connection_may_watch_many_polls() {
        let registry = SubscriptionRegistry::new();
        let (conn, _rx) = Connection::open();
        registry.subscribe(&conn, poll(1)).await;
        registry.subscribe(&conn, poll(2)).await;

        assert_eq!(registry.subscriber_count(poll(1)).await, 1);
        assert_eq!(registry.subscriber_count(poll(2)).await, 1);
        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn unsubscribe_removes_only_that_poll() {
        let registry = SubscriptionRegistry::new();
        let (conn, _rx) = Connection::open();
        registry.subscribe(&conn, poll(1)).await;
        registry.subscribe(&conn, poll(2)).await;

        assert!(registry.unsubscribe(conn.id(), poll(1)).await);
        assert!(!registry.unsubscribe(conn.id(), poll(1)).await);

        assert!(registry.subscribers_of(poll(1)).await.is_empty());
        assert_eq!(registry.subscriber_count(poll(2)).await, 1);
    }

    #[tokio::test]
    async fn unsubscribe_all_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let (a, _rx_a) = Connection::open();
        let (b, _rx_b) = Connection::open();
        registry.subscribe(&a, poll(1)).await;
        registry.subscribe(&a, poll(2)).await;
        registry.subscribe(&b, poll(1)).await;

        assert_eq!(registry.unsubscribe_all(a.id()).await, 2);
        assert_eq!(registry.unsubscribe_all(a.id()).await, 0);

        let remaining: Vec<ConnectionId> = registry
            .subscribers_of(poll(1))
            .await
            .iter()
            .map(Connection::id)
            .collect();
        assert_eq!(remaining, vec![b.id()]);
        assert_eq!(registry.subscriber_count(poll(2)).await, 0);
    }

    #[tokio::test]
    async fn snapshot_is_stable_under_churn() {
        let registry = SubscriptionRegistry::new();
        let (a, _rx_a) = Connection::open();
        registry.subscribe(&a, poll(1)).await;

        let snapshot = registry.subscribers_of(poll(1)).await;
        registry.unsubscribe_all(a.id()).await;

        assert_eq!(snapshot.len(), 1);
        assert!(registry.subscribers_of(poll(1)).await.is_empty());
    }
}
