//! Quiet-period trigger in front of an [`AutosaveQueue`].
//!
//! The queue's guarantees are about what is sent; when the first enqueue
//! happens is a policy decided here. Every `schedule` restarts the quiet
//! period, and only the latest scheduled document reaches the queue.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use log::debug;
use serde::Serialize;

use super::{AutosaveQueue, SaveBackend, SaveTicket};

/// Default quiet period before a scheduled edit is enqueued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

struct Slot<D> {
    generation: u64,
    waiting: Option<D>,
}

/// Delays enqueueing until edits stop arriving for `delay`.
pub struct Debouncer<D, B> {
    queue: AutosaveQueue<D, B>,
    delay: Duration,
    slot: Arc<Mutex<Slot<D>>>,
}

fn lock<D>(slot: &Mutex<Slot<D>>) -> MutexGuard<'_, Slot<D>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<D, B> Debouncer<D, B>
where
    D: Serialize + Clone + Send + 'static,
    B: SaveBackend<D>,
{
    /// Wraps `queue` with the given quiet period.
    pub fn new(queue: AutosaveQueue<D, B>, delay: Duration) -> Self {
        Self {
            queue,
            delay,
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                waiting: None,
            })),
        }
    }

    /// The queue edits are released into.
    pub fn queue(&self) -> &AutosaveQueue<D, B> {
        &self.queue
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the waiting document and restarts the quiet period.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn schedule(&self, document: D) {
        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.waiting = Some(document);
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        let queue = self.queue.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let document = {
                let mut slot = lock(&slot);
                if slot.generation != generation {
                    return;
                }
                slot.waiting.take()
            };
            if let Some(document) = document {
                debug!("Quiet period elapsed; enqueueing latest edit");
                // Failures are reported through the queue's error handler.
                drop(queue.enqueue(document));
            }
        });
    }

    /// Enqueues the waiting document immediately, if there is one.
    pub fn flush_now(&self) -> Option<SaveTicket> {
        let document = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.waiting.take()
        };
        document.map(|document| self.queue.enqueue(document))
    }

    /// Drops the waiting document without saving it.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        slot.waiting = None;
    }

    /// Whether a document is waiting for its quiet period to end.
    pub fn is_waiting(&self) -> bool {
        lock(&self.slot).waiting.is_some()
    }
}
