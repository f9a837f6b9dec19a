//! Integration tests for live results delivery.
//!
//! Votes go through `SubmitVoteHandler` with the `BroadcastCoordinator` as
//! its observer; subscribers read aggregates from their `ConnectionReceiver`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use pollcast::adapters::memory::{InMemoryPollStore, InMemoryVoteLedger};
use pollcast::application::broadcast::{
    BroadcastCoordinator, Connection, ConnectionReceiver, SubscriptionRegistry,
};
use pollcast::application::handlers::poll::{
    CreatePollCommand, CreatePollHandler, GetResultsHandler, SubmitVoteCommand, SubmitVoteHandler,
};
use pollcast::domain::foundation::{OptionId, PollId};
use pollcast::domain::poll::{
    PollKind, PollLimits, PollResults, ResultsPayload, VoteError, VoteRules, VoteSubmission,
};
use pollcast::ports::VoteLedger;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    ledger: InMemoryVoteLedger,
    registry: Arc<SubscriptionRegistry>,
    coordinator: BroadcastCoordinator,
    create: CreatePollHandler,
    submit: SubmitVoteHandler,
}

fn harness() -> Harness {
    let store = InMemoryPollStore::new();
    let ledger = InMemoryVoteLedger::new();
    let results = GetResultsHandler::new(Arc::new(store.clone()), Arc::new(ledger.clone()));
    let registry = Arc::new(SubscriptionRegistry::new());
    let coordinator = BroadcastCoordinator::new(results, registry.clone());

    Harness {
        create: CreatePollHandler::new(Arc::new(store.clone()), PollLimits::default()),
        submit: SubmitVoteHandler::new(
            Arc::new(store),
            Arc::new(ledger.clone()),
            Arc::new(coordinator.clone()),
            VoteRules::default(),
        ),
        ledger,
        registry,
        coordinator,
    }
}

impl Harness {
    async fn poll(&self, kind: PollKind, options: &[&str]) -> (PollId, Vec<OptionId>) {
        let poll = self
            .create
            .handle(CreatePollCommand {
                question: "How was it?".to_string(),
                kind,
                options: options.iter().map(|s| s.to_string()).collect(),
                created_by: None,
            })
            .await
            .unwrap();
        (poll.id, poll.options.iter().map(|o| o.id).collect())
    }

    async fn vote(&self, poll_id: PollId, submission: VoteSubmission) -> Result<(), VoteError> {
        self.submit
            .handle(SubmitVoteCommand {
                poll_id,
                submission,
                voter_id: None,
            })
            .await
            .map(|_| ())
    }

    async fn watch(&self, poll_id: PollId) -> (Connection, ConnectionReceiver) {
        let (connection, receiver) = Connection::open();
        self.registry.subscribe(&connection, poll_id).await;
        (connection, receiver)
    }

    async fn settle(&self, poll_id: PollId) {
        timeout(Duration::from_secs(2), async {
            while self.coordinator.is_busy(poll_id) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}

async fn next(rx: &mut ConnectionReceiver) -> Arc<PollResults> {
    timeout(Duration::from_secs(2), rx.next_update())
        .await
        .expect("no update within timeout")
        .expect("connection closed")
}

async fn nothing_more(rx: &mut ConnectionReceiver) -> bool {
    timeout(Duration::from_millis(100), rx.next_update())
        .await
        .is_err()
}

/// Read until the aggregate reaches `version`, checking versions only rise.
async fn read_until(rx: &mut ConnectionReceiver, version: u64) -> Arc<PollResults> {
    let mut last = 0;
    loop {
        let update = next(rx).await;
        assert!(update.version > last, "version went {} -> {}", last, update.version);
        last = update.version;
        if last >= version {
            return update;
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

#[tokio::test]
async fn subscriber_sees_each_vote_reflected() {
    let h = harness();
    let (poll_id, options) = h.poll(PollKind::SingleChoice, &["Red", "Blue"]).await;
    let (_conn, mut rx) = h.watch(poll_id).await;

    h.vote(poll_id, VoteSubmission::option(options[1])).await.unwrap();

    let update = read_until(&mut rx, 1).await;
    match &update.results {
        ResultsPayload::Choice(tally) => {
            assert_eq!(tally.count_for("Red"), Some(0));
            assert_eq!(tally.count_for("Blue"), Some(1));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[tokio::test]
async fn concurrent_burst_is_monotonic_and_converges() {
    let h = Arc::new(harness());
    let (poll_id, _) = h.poll(PollKind::WordCloud, &[]).await;
    let (_conn, mut rx) = h.watch(poll_id).await;

    let mut tasks = Vec::new();
    for i in 0..50 {
        let h = Arc::clone(&h);
        tasks.push(tokio::spawn(async move {
            let word = if i % 2 == 0 { "even" } else { "odd" };
            h.vote(poll_id, VoteSubmission::value(word)).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let update = read_until(&mut rx, 50).await;
    match &update.results {
        ResultsPayload::WordCloud(words) => {
            assert_eq!(words.count_for("even"), Some(25));
            assert_eq!(words.count_for("odd"), Some(25));
        }
        other => panic!("unexpected payload {:?}", other),
    }
    h.settle(poll_id).await;
    assert!(nothing_more(&mut rx).await);
}

#[tokio::test]
async fn duplicate_subscribe_delivers_once() {
    let h = harness();
    let (poll_id, _) = h.poll(PollKind::OpenText, &[]).await;
    let (conn, mut rx) = h.watch(poll_id).await;
    assert!(!h.registry.subscribe(&conn, poll_id).await);

    h.vote(poll_id, VoteSubmission::value("hi")).await.unwrap();
    assert_eq!(next(&mut rx).await.version, 1);

    h.settle(poll_id).await;
    assert!(nothing_more(&mut rx).await);
}

#[tokio::test]
async fn dropped_subscriber_does_not_block_others() {
    let h = harness();
    let (poll_id, _) = h.poll(PollKind::Rating, &[]).await;
    let (_gone, gone_rx) = h.watch(poll_id).await;
    let (_live, mut live_rx) = h.watch(poll_id).await;
    drop(gone_rx);

    h.vote(poll_id, VoteSubmission::value("4")).await.unwrap();
    h.vote(poll_id, VoteSubmission::value("2")).await.unwrap();

    let update = read_until(&mut live_rx, 2).await;
    match &update.results {
        ResultsPayload::Rating(summary) => {
            assert_eq!(summary.count, 2);
            assert!((summary.average - 3.0).abs() < f64::EPSILON);
        }
        other => panic!("unexpected payload {:?}", other),
    }

    h.settle(poll_id).await;
    assert_eq!(h.registry.subscriber_count(poll_id).await, 1);
}

#[tokio::test]
async fn subscribers_of_other_polls_are_untouched() {
    let h = harness();
    let (voted, _) = h.poll(PollKind::OpenText, &[]).await;
    let (quiet, _) = h.poll(PollKind::OpenText, &[]).await;
    let (_conn, mut quiet_rx) = h.watch(quiet).await;

    h.vote(voted, VoteSubmission::value("hello")).await.unwrap();
    h.settle(voted).await;

    assert!(nothing_more(&mut quiet_rx).await);
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn rejected_vote_changes_nothing() {
    let h = harness();
    let (poll_id, _) = h.poll(PollKind::Quiz, &["A", "B"]).await;
    let (_, foreign) = h.poll(PollKind::Quiz, &["C"]).await;
    let (_conn, mut rx) = h.watch(poll_id).await;

    let err = h
        .vote(poll_id, VoteSubmission::option(foreign[0]))
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::InvalidPayload(_)));

    assert_eq!(h.ledger.count(poll_id).await.unwrap(), 0);
    assert!(!h.coordinator.is_busy(poll_id));
    assert!(nothing_more(&mut rx).await);
}
