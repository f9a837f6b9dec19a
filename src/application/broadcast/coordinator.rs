//! Broadcast coordinator: recompute and push after each accepted vote.
//!
//! Each poll has at most one worker task. A vote marks its poll dirty and
//! starts a worker only if none is running; the worker keeps recomputing
//! until no vote arrived during its last pass. A burst of votes therefore
//! costs one or two recomputes, not one per vote.
//!
//! ```text
//! vote ─▶ on_vote_accepted ─▶ slot{pending} ──spawn if idle──▶ worker
//!                                                              │
//!            ┌─────────────── loop while pending ◀─────────────┘
//!            ▼
//!   GetResultsHandler ─▶ registry snapshot ─▶ Connection::deliver (x N)
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;

use crate::application::handlers::poll::GetResultsHandler;
use crate::domain::foundation::PollId;
use crate::domain::poll::Vote;
use crate::ports::VoteObserver;

use super::registry::SubscriptionRegistry;

#[derive(Debug, Default)]
struct WorkerSlot {
    pending: bool,
}

struct Inner {
    results: GetResultsHandler,
    registry: Arc<SubscriptionRegistry>,
    /// Present while a worker runs for the poll.
    workers: Mutex<HashMap<PollId, WorkerSlot>>,
}

/// Fans fresh aggregates out to subscribers with per-poll coalescing.
#[derive(Clone)]
pub struct BroadcastCoordinator {
    inner: Arc<Inner>,
}

impl BroadcastCoordinator {
    pub fn new(results: GetResultsHandler, registry: Arc<SubscriptionRegistry>) -> Self {
        Self {
            inner: Arc::new(Inner {
                results,
                registry,
                workers: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.inner.registry
    }

    /// Schedule a recompute-and-broadcast for `poll_id`.
    ///
    /// Never waits on delivery. Must be called from within a Tokio runtime.
    pub fn schedule(&self, poll_id: PollId) {
        let mut workers = self.lock_workers();
        if let Some(slot) = workers.get_mut(&poll_id) {
            slot.pending = true;
            return;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(poll_id = %poll_id, "No runtime for broadcast worker: {}", e);
                return;
            }
        };

        workers.insert(poll_id, WorkerSlot { pending: true });
        drop(workers);

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            let guard = WorkerGuard {
                inner: &inner,
                poll_id,
                armed: true,
            };
            run_worker(guard).await;
        });
    }

    /// True while a worker is recomputing for the poll.
    pub fn is_busy(&self, poll_id: PollId) -> bool {
        self.lock_workers().contains_key(&poll_id)
    }

    fn lock_workers(&self) -> std::sync::MutexGuard<'_, HashMap<PollId, WorkerSlot>> {
        self.inner
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl VoteObserver for BroadcastCoordinator {
    fn on_vote_accepted(&self, vote: &Vote) {
        self.schedule(vote.poll_id);
    }
}

/// Releases the poll's worker slot if the worker dies mid-pass.
struct WorkerGuard<'a> {
    inner: &'a Inner,
    poll_id: PollId,
    armed: bool,
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.poll_id);
        }
    }
}

async fn run_worker(mut guard: WorkerGuard<'_>) {
    let poll_id = guard.poll_id;
    loop {
        {
            let mut workers = guard
                .inner
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match workers.get_mut(&poll_id) {
                Some(slot) if slot.pending => slot.pending = false,
                _ => {
                    // Released under the lock that saw pending clear.
                    workers.remove(&poll_id);
                    guard.armed = false;
                    return;
                }
            }
        }

        broadcast_once(guard.inner, poll_id).await;
    }
}

async fn broadcast_once(inner: &Inner, poll_id: PollId) {
    let subscribers = inner.registry.subscribers_of(poll_id).await;
    if subscribers.is_empty() {
        return;
    }

    let results = match inner.results.handle(poll_id).await {
        Ok(results) => Arc::new(results),
        Err(e) => {
            tracing::warn!(poll_id = %poll_id, error = %e, "Recompute failed, skipping broadcast");
            return;
        }
    };

    let mut closed = Vec::new();
    for connection in &subscribers {
        if let Err(e) = connection.deliver(Arc::clone(&results)) {
            tracing::debug!(poll_id = %poll_id, connection_id = %connection.id(), "{}", e);
            closed.push(connection.id());
        }
    }

    for connection_id in closed {
        inner.registry.unsubscribe_all(connection_id).await;
    }

    tracing::trace!(
        poll_id = %poll_id,
        version = results.version,
        subscribers = subscribers.len(),
        "Results broadcast"
    );
}
