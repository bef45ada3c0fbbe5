//! Tests for the autosave queue and debouncer.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use super::*;
use crate::error::{Result, TempoError};

/// Backend whose saves complete only when the test says so.
#[derive(Clone, Default)]
struct ManualBackend {
    calls: Arc<Mutex<Vec<Value>>>,
    responders: Arc<Mutex<VecDeque<oneshot::Sender<Result<()>>>>>,
}

impl ManualBackend {
    fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }

    fn outstanding(&self) -> usize {
        self.responders.lock().unwrap().len()
    }

    /// Completes the oldest outstanding save.
    fn respond(&self, result: Result<()>) {
        let responder = self
            .responders
            .lock()
            .unwrap()
            .pop_front()
            .expect("no save is outstanding");
        responder.send(result).expect("save future dropped");
    }
}

#[async_trait]
impl SaveBackend<Value> for ManualBackend {
    async fn save(&self, document: Value) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(document);
        self.responders.lock().unwrap().push_back(tx);
        rx.await.unwrap_or(Ok(()))
    }
}

/// Lets spawned save tasks run up to their next suspension point.
async fn settle_tasks() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn manual_queue() -> (ManualBackend, AutosaveQueue<Value, ManualBackend>) {
    let backend = ManualBackend::default();
    (backend.clone(), AutosaveQueue::new(backend))
}

#[tokio::test]
async fn test_identical_consecutive_enqueues_save_once() {
    let (backend, queue) = manual_queue();

    let first = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    let second = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;

    backend.respond(Ok(()));
    assert_eq!(first.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(second.await.unwrap(), SaveOutcome::Saved);

    let third = queue.enqueue(json!({"v": 1}));
    assert_eq!(third.await.unwrap(), SaveOutcome::Unchanged);
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);
}

#[tokio::test]
async fn test_seed_suppresses_resave() {
    let (backend, queue) = manual_queue();

    queue.seed(&json!({"title": "Push", "sections": []})).unwrap();
    let ticket = queue.enqueue(json!({"sections": [], "title": "Push"}));

    assert_eq!(ticket.await.unwrap(), SaveOutcome::Unchanged);
    settle_tasks().await;
    assert!(backend.calls().is_empty());
    assert!(!queue.is_in_flight());
}

#[tokio::test]
async fn test_seed_never_saves() {
    let (backend, queue) = manual_queue();

    queue.seed(&json!({"v": 0})).unwrap();
    settle_tasks().await;

    assert!(backend.calls().is_empty());
    assert_eq!(queue.last_seeded(), Some(json!({"v": 0})));
}

#[tokio::test]
async fn test_seed_during_save_survives_its_completion() {
    let (backend, queue) = manual_queue();

    let saving = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    queue.seed(&json!({"v": 5})).unwrap();

    backend.respond(Ok(()));
    assert_eq!(saving.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(queue.last_seeded(), Some(json!({"v": 5})));

    let again = queue.enqueue(json!({"v": 5}));
    assert_eq!(again.await.unwrap(), SaveOutcome::Unchanged);
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);
}

#[tokio::test]
async fn test_newest_intent_wins_under_contention() {
    let (backend, queue) = manual_queue();

    let t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);

    let t2 = queue.enqueue(json!({"v": 2}));
    let t3 = queue.enqueue(json!({"v": 3}));
    assert!(queue.has_pending());
    assert_eq!(queue.pending(), Some(json!({"v": 3})));

    backend.respond(Ok(()));
    settle_tasks().await;
    assert_eq!(t1.await.unwrap(), SaveOutcome::Saved);

    // The intermediate value {v: 2} is never persisted.
    assert_eq!(backend.calls(), vec![json!({"v": 1}), json!({"v": 3})]);
    assert!(queue.is_in_flight());

    backend.respond(Ok(()));
    assert_eq!(t2.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(t3.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(queue.last_seeded(), Some(json!({"v": 3})));
    assert!(!queue.is_in_flight());
}

#[tokio::test]
async fn test_second_save_carries_exactly_the_pending_intent() {
    let (backend, queue) = manual_queue();

    let _t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    let t2 = queue.enqueue(json!({"v": 2}));

    backend.respond(Ok(()));
    settle_tasks().await;

    assert_eq!(backend.calls(), vec![json!({"v": 1}), json!({"v": 2})]);
    backend.respond(Ok(()));
    assert_eq!(t2.await.unwrap(), SaveOutcome::Saved);
}

#[tokio::test]
async fn test_returning_to_in_flight_value_drops_pending() {
    let (backend, queue) = manual_queue();

    let _t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    let t2 = queue.enqueue(json!({"v": 2}));
    let t3 = queue.enqueue(json!({"v": 1}));
    assert!(!queue.has_pending());

    backend.respond(Ok(()));
    assert_eq!(t2.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(t3.await.unwrap(), SaveOutcome::Saved);

    settle_tasks().await;
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);
    assert_eq!(backend.outstanding(), 0);
}

#[tokio::test]
async fn test_at_most_one_save_in_flight() {
    let (backend, queue) = manual_queue();

    let mut tickets = Vec::new();
    for v in 0..10 {
        tickets.push(queue.enqueue(json!({ "v": v })));
        settle_tasks().await;
        assert!(backend.outstanding() <= 1);
    }

    while backend.outstanding() > 0 {
        backend.respond(Ok(()));
        settle_tasks().await;
    }

    assert_eq!(backend.calls(), vec![json!({"v": 0}), json!({"v": 9})]);
    for ticket in tickets {
        assert_eq!(ticket.await.unwrap(), SaveOutcome::Saved);
    }
}

#[tokio::test]
async fn test_failure_reports_and_preserves_pending() {
    let backend = ManualBackend::default();
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&errors);
    let queue = AutosaveQueue::with_error_handler(backend.clone(), move |err: &TempoError| {
        assert!(err.to_string().contains("offline"));
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    let t2 = queue.enqueue(json!({"v": 2}));

    backend.respond(Err(TempoError::backend("offline")));
    assert!(matches!(t1.await, Err(TempoError::SaveFailed { .. })));
    assert!(matches!(t2.await, Err(TempoError::SaveFailed { .. })));

    settle_tasks().await;
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert!(!queue.is_in_flight());
    assert_eq!(queue.pending(), Some(json!({"v": 2})));
    assert_eq!(queue.last_seeded(), None);
    // No automatic retry.
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);
}

#[tokio::test]
async fn test_reenqueue_after_failure_retries() {
    let (backend, queue) = manual_queue();

    let t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    backend.respond(Err(TempoError::backend("timeout")));
    assert!(t1.await.is_err());

    let retry = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    backend.respond(Ok(()));

    assert_eq!(retry.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(backend.calls(), vec![json!({"v": 1}), json!({"v": 1})]);
}

#[tokio::test]
async fn test_flush_dispatches_retained_intent() {
    let (backend, queue) = manual_queue();

    let _t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    let _t2 = queue.enqueue(json!({"v": 2}));
    backend.respond(Err(TempoError::backend("502")));
    settle_tasks().await;

    let flushed = queue.flush();
    settle_tasks().await;
    assert_eq!(backend.calls(), vec![json!({"v": 1}), json!({"v": 2})]);

    backend.respond(Ok(()));
    assert_eq!(flushed.await.unwrap(), SaveOutcome::Saved);
    assert!(!queue.has_pending());

    assert_eq!(queue.flush().await.unwrap(), SaveOutcome::Unchanged);
}

#[tokio::test]
async fn test_rejected_document_is_retained_for_flush() {
    let (backend, queue) = manual_queue();

    let t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    backend.respond(Err(TempoError::backend("503")));
    assert!(t1.await.is_err());
    assert_eq!(queue.pending(), Some(json!({"v": 1})));

    let flushed = queue.flush();
    settle_tasks().await;
    backend.respond(Ok(()));
    assert_eq!(flushed.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(queue.last_seeded(), Some(json!({"v": 1})));
}

#[tokio::test]
async fn test_reset_ignores_late_completion() {
    let (backend, queue) = manual_queue();

    let stale = queue.enqueue(json!({"doc": "a"}));
    settle_tasks().await;
    let epoch = queue.epoch();

    queue.reset();
    assert_eq!(queue.epoch(), epoch + 1);
    assert_eq!(stale.await.unwrap(), SaveOutcome::Discarded);
    assert!(!queue.is_in_flight());

    queue.seed(&json!({"doc": "b"})).unwrap();
    backend.respond(Ok(()));
    settle_tasks().await;

    // The late acknowledgement of document "a" does not touch the new state.
    assert_eq!(queue.last_seeded(), Some(json!({"doc": "b"})));
    assert!(!queue.is_in_flight());
}

#[tokio::test]
async fn test_reset_discards_pending_intent() {
    let (backend, queue) = manual_queue();

    let _t1 = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    let pending = queue.enqueue(json!({"v": 2}));

    queue.reset();
    assert_eq!(pending.await.unwrap(), SaveOutcome::Discarded);

    backend.respond(Ok(()));
    settle_tasks().await;
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);
    assert_eq!(queue.last_seeded(), None);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_slow_backend_scenario() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let queue = AutosaveQueue::new(move |doc: Value| {
        let recorded = Arc::clone(&recorded);
        async move {
            recorded.lock().unwrap().push(doc);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<(), TempoError>(())
        }
    });

    let first = queue.enqueue(json!({"v": 1}));
    settle_tasks().await;
    assert_eq!(*calls.lock().unwrap(), vec![json!({"v": 1})]);

    let second = queue.enqueue(json!({"v": 1}));
    tokio::time::advance(Duration::from_millis(60)).await;

    assert_eq!(first.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(second.await.unwrap(), SaveOutcome::Saved);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_debouncer_releases_only_latest_edit() {
    let (backend, queue) = manual_queue();
    let debouncer = Debouncer::new(queue, Duration::from_millis(100));

    // Each scheduled task must be polled once to arm its timer.
    debouncer.schedule(json!({"v": 1}));
    settle_tasks().await;
    tokio::time::advance(Duration::from_millis(60)).await;
    debouncer.schedule(json!({"v": 2}));
    settle_tasks().await;
    tokio::time::advance(Duration::from_millis(60)).await;
    settle_tasks().await;
    assert!(backend.calls().is_empty());
    assert!(debouncer.is_waiting());

    tokio::time::advance(Duration::from_millis(50)).await;
    settle_tasks().await;
    assert_eq!(backend.calls(), vec![json!({"v": 2})]);
    assert!(!debouncer.is_waiting());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_debouncer_flush_and_cancel() {
    let (backend, queue) = manual_queue();
    let debouncer = Debouncer::new(queue, Duration::from_millis(100));

    debouncer.schedule(json!({"v": 1}));
    let ticket = debouncer.flush_now().expect("an edit was waiting");
    settle_tasks().await;
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);
    backend.respond(Ok(()));
    assert_eq!(ticket.await.unwrap(), SaveOutcome::Saved);

    debouncer.schedule(json!({"v": 2}));
    debouncer.cancel();
    tokio::time::advance(Duration::from_millis(200)).await;
    settle_tasks().await;
    assert_eq!(backend.calls(), vec![json!({"v": 1})]);
    assert!(debouncer.flush_now().is_none());
}

type Recorded = Arc<Mutex<Vec<Value>>>;

/// Queue over a backend that confirms every save as soon as it runs.
fn recording_queue() -> (
    Recorded,
    AutosaveQueue<Value, impl SaveBackend<Value>>,
) {
    let calls: Recorded = Arc::default();
    let sink = Arc::clone(&calls);
    let queue = AutosaveQueue::new(move |document: Value| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push(document);
            Ok::<(), TempoError>(())
        }
    });
    (calls, queue)
}

fn current_thread_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn arb_documents() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec((0..3u8, any::<bool>()), 1..12).prop_map(|docs| {
        docs.into_iter()
            .map(|(v, flag)| json!({"v": v, "flag": flag}))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_awaited_enqueues_save_only_changes(
        seed in (0..3u8, any::<bool>()),
        documents in arb_documents(),
    ) {
        let seed = json!({"flag": seed.1, "v": seed.0});
        let runtime = current_thread_runtime();
        let (calls, queue) = recording_queue();

        runtime.block_on(async {
            queue.seed(&seed).unwrap();
            for document in &documents {
                queue.enqueue(document.clone()).await.unwrap();
            }
        });

        let mut expected = Vec::new();
        let mut confirmed = seed;
        for document in documents {
            if document != confirmed {
                expected.push(document.clone());
                confirmed = document;
            }
        }
        prop_assert_eq!(calls.lock().unwrap().clone(), expected);
    }

    #[test]
    fn prop_burst_saves_first_and_newest(documents in arb_documents()) {
        let runtime = current_thread_runtime();
        let (calls, queue) = recording_queue();

        let outcomes = runtime.block_on(async {
            let tickets: Vec<SaveTicket> =
                documents.iter().map(|document| queue.enqueue(document.clone())).collect();
            let mut outcomes = Vec::new();
            for ticket in tickets {
                outcomes.push(ticket.await.unwrap());
            }
            outcomes
        });

        let first = documents.first().cloned();
        let last = documents.last().cloned();
        let mut expected: Vec<Value> = first.iter().cloned().collect();
        if last != first {
            expected.extend(last.clone());
        }
        prop_assert_eq!(calls.lock().unwrap().clone(), expected);
        prop_assert!(outcomes.iter().all(|outcome| *outcome == SaveOutcome::Saved));
        prop_assert_eq!(queue.last_seeded(), last);
    }
}
