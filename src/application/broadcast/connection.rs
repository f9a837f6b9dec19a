//! Live subscriber connections.
//!
//! Each connection owns a single slot per poll holding the newest aggregate
//! delivered for it. Delivering overwrites the slot instead of queueing, so
//! a slow reader never builds a backlog: it skips intermediate aggregates
//! and wakes up to the latest one.
//!
//! ```text
//!  coordinator ──deliver(v3)──▶ [poll 1: v3] [poll 2: v7] ──next_update──▶ socket
//!  coordinator ──deliver(v2)──▶ (dropped, older than v3)
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::foundation::PollId;
use crate::domain::poll::PollResults;

/// Unique identifier for a subscriber connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery to a connection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The receiving side has gone away.
    #[error("Connection {0} is closed")]
    Closed(ConnectionId),
}

#[derive(Debug)]
struct Slot {
    results: Arc<PollResults>,
    /// Bumped each time the slot is created, so a leave-then-rejoin is
    /// seen as fresh even when the version has not moved.
    epoch: u64,
}

#[derive(Debug, Default)]
struct Slots {
    entries: BTreeMap<PollId, Slot>,
    next_epoch: u64,
}

/// Sending half of a connection, held by the registry and the transport.
///
/// Cloning yields another handle to the same connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    slots: Arc<watch::Sender<Slots>>,
}

impl Connection {
    /// Open a connection and return both halves.
    pub fn open() -> (Connection, ConnectionReceiver) {
        let id = ConnectionId::new();
        let (tx, rx) = watch::channel(Slots::default());
        let connection = Connection {
            id,
            slots: Arc::new(tx),
        };
        let receiver = ConnectionReceiver {
            id,
            slots: rx,
            sent: HashMap::new(),
            cursor: None,
        };
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Hand an aggregate to the connection without waiting for the reader.
    ///
    /// Anything not newer than what the slot already holds is discarded,
    /// which keeps delivery monotonic per poll even if callers race.
    ///
    /// # Errors
    ///
    /// `DeliveryError::Closed` once the receiver has been dropped.
    pub fn deliver(&self, results: Arc<PollResults>) -> Result<(), DeliveryError> {
        if self.slots.is_closed() {
            return Err(DeliveryError::Closed(self.id));
        }

        self.slots.send_if_modified(|slots| {
            if let Some(slot) = slots.entries.get_mut(&results.poll_id) {
                if results.version <= slot.results.version {
                    return false;
                }
                slot.results = results;
                return true;
            }

            let epoch = slots.next_epoch;
            slots.next_epoch += 1;
            slots
                .entries
                .insert(results.poll_id, Slot { results, epoch });
            true
        });
        Ok(())
    }

    /// Drop the held aggregate for a poll the viewer has left.
    pub fn forget(&self, poll_id: PollId) {
        self.slots
            .send_if_modified(|slots| slots.entries.remove(&poll_id).is_some());
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }
}

/// Receiving half of a connection, owned by the transport task.
#[derive(Debug)]
pub struct ConnectionReceiver {
    id: ConnectionId,
    slots: watch::Receiver<Slots>,
    /// (epoch, version) last handed out per poll.
    sent: HashMap<PollId, (u64, u64)>,
    /// Poll handed out last; the next scan starts after it.
    cursor: Option<PollId>,
}

impl ConnectionReceiver {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Wait for the next aggregate newer than the last one handed out for
    /// its poll.
    ///
    /// Returns `None` once every `Connection` handle is dropped and nothing
    /// is left unread.
    pub async fn next_update(&mut self) -> Option<Arc<PollResults>> {
        loop {
            if let Some(results) = self.take_unsent() {
                return Some(results);
            }
            if self.slots.changed().await.is_err() {
                return self.take_unsent();
            }
        }
    }

    fn take_unsent(&mut self) -> Option<Arc<PollResults>> {
        let slots = self.slots.borrow_and_update();
        self.sent.retain(|poll_id, _| slots.entries.contains_key(poll_id));

        // Round-robin from the cursor so one busy poll cannot starve the rest.
        let ordered: Box<dyn Iterator<Item = (&PollId, &Slot)> + '_> = match self.cursor {
            Some(last) => Box::new(
                slots
                    .entries
                    .range((Excluded(last), Unbounded))
                    .chain(slots.entries.range(..=last)),
            ),
            None => Box::new(slots.entries.iter()),
        };

        for (poll_id, slot) in ordered {
            let fresh = match self.sent.get(poll_id) {
                Some(&(epoch, version)) => epoch != slot.epoch || slot.results.version > version,
                None => true,
            };
            if fresh {
                self.sent
                    .insert(*poll_id, (slot.epoch, slot.results.version));
                self.cursor = Some(*poll_id);
                return Some(Arc::clone(&slot.results));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::poll::{PollKind, RatingSummary, ResultsPayload};
    use std::time::Duration;
    use tokio::time::timeout;

    fn results(poll: i64, version: u64) -> Arc<PollResults> {
        Arc::new(PollResults {
            poll_id: PollId::new(poll),
            question: "Q".to_string(),
            kind: PollKind::Rating,
            results: ResultsPayload::Rating(RatingSummary {
                average: 3.0,
                count: version,
            }),
            version,
        })
    }

    async fn next(rx: &mut ConnectionReceiver) -> Option<Arc<PollResults>> {
        timeout(Duration::from_millis(100), rx.next_update())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn reader_sees_latest_only() {
        let (conn, mut rx) = Connection::open();
        conn.deliver(results(1, 1)).unwrap();
        conn.deliver(results(1, 2)).unwrap();
        conn.deliver(results(1, 3)).unwrap();

        assert_eq!(next(&mut rx).await.unwrap().version, 3);
        assert!(next(&mut rx).await.is_none());
    }

    #[tokio::test]
    async fn older_aggregate_never_follows_newer() {
        let (conn, mut rx) = Connection::open();
        conn.deliver(results(1, 5)).unwrap();
        assert_eq!(next(&mut rx).await.unwrap().version, 5);

        conn.deliver(results(1, 4)).unwrap();
        conn.deliver(results(1, 5)).unwrap();
        assert!(next(&mut rx).await.is_none());
    }

    #[tokio::test]
    async fn polls_do_not_overwrite_each_other() {
        let (conn, mut rx) = Connection::open();
        conn.deliver(results(1, 1)).unwrap();
        conn.deliver(results(2, 1)).unwrap();

        let mut seen = vec![
            next(&mut rx).await.unwrap().poll_id,
            next(&mut rx).await.unwrap().poll_id,
        ];
        seen.sort();
        assert_eq!(seen, vec![PollId::new(1), PollId::new(2)]);
    }

    #[tokio::test]
    async fn busy_poll_does_not_starve_other_polls() {
        let (conn, mut rx) = Connection::open();
        conn.deliver(results(2, 1)).unwrap();

        let mut other_seen = false;
        for version in 1..=10 {
            conn.deliver(results(1, version)).unwrap();
            let update = next(&mut rx).await.unwrap();
            if update.poll_id == PollId::new(2) {
                other_seen = true;
                break;
            }
        }
        assert!(other_seen);
    }

    #[tokio::test]
    async fn scan_wraps_around_to_lower_polls() {
        let (conn, mut rx) = Connection::open();
        conn.deliver(results(1, 1)).unwrap();
        conn.deliver(results(3, 1)).unwrap();
        assert_eq!(next(&mut rx).await.unwrap().poll_id, PollId::new(1));
        assert_eq!(next(&mut rx).await.unwrap().poll_id, PollId::new(3));

        conn.deliver(results(1, 2)).unwrap();
        let update = next(&mut rx).await.unwrap();
        assert_eq!((update.poll_id, update.version), (PollId::new(1), 2));
    }

    #[tokio::test]
    async fn rejoin_resends_current_aggregate() {
        let (conn, mut rx) = Connection::open();
        conn.deliver(results(1, 2)).unwrap();
        assert_eq!(next(&mut rx).await.unwrap().version, 2);

        conn.forget(PollId::new(1));
        conn.deliver(results(1, 2)).unwrap();
        assert_eq!(next(&mut rx).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn delivery_fails_after_receiver_drops() {
        let (conn, rx) = Connection::open();
        let id = rx.id();
        drop(rx);

        assert!(conn.is_closed());
        assert_eq!(conn.deliver(results(1, 1)), Err(DeliveryError::Closed(id)));
    }

    #[tokio::test]
    async fn receiver_ends_when_all_handles_drop() {
        let (conn, mut rx) = Connection::open();
        conn.deliver(results(1, 1)).unwrap();
        drop(conn);

        assert_eq!(rx.next_update().await.unwrap().version, 1);
        assert!(rx.next_update().await.is_none());
    }
}
