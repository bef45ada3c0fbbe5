//! The coalescing save queue.

use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, warn};
use serde::Serialize;

use super::{
    ticket::{settle, Waiter},
    SaveBackend, SaveOutcome, SaveTicket,
};
use crate::{
    equality::Fingerprint,
    error::{Result, TempoError},
};

type ErrorHandler = Box<dyn Fn(&TempoError) + Send + Sync>;

/// The save currently awaiting the backend.
struct InFlight<D> {
    document: D,
    fingerprint: Fingerprint,
    waiters: Vec<Waiter>,
    /// `seed` ran while this save was in flight; the seed stays authoritative.
    reseeded: bool,
}

/// The newest intent not yet handed to the backend.
struct Pending<D> {
    document: D,
    fingerprint: Fingerprint,
    waiters: Vec<Waiter>,
}

struct QueueState<D> {
    /// Bumped by `reset`; completions from an older epoch are ignored.
    epoch: u64,
    last_seeded: Option<(D, Fingerprint)>,
    in_flight: Option<InFlight<D>>,
    pending: Option<Pending<D>>,
}

impl<D> Default for QueueState<D> {
    fn default() -> Self {
        Self {
            epoch: 0,
            last_seeded: None,
            in_flight: None,
            pending: None,
        }
    }
}

impl<D> QueueState<D> {
    fn matches_seeded(&self, fingerprint: &Fingerprint) -> bool {
        self.last_seeded
            .as_ref()
            .is_some_and(|(_, seeded)| seeded == fingerprint)
    }

    /// Resolves every outstanding ticket and forgets both pending and
    /// in-flight intents.
    fn discard_outstanding(&mut self) {
        if let Some(pending) = self.pending.take() {
            settle(pending.waiters, || Ok(SaveOutcome::Discarded));
        }
        if let Some(in_flight) = self.in_flight.take() {
            settle(in_flight.waiters, || Ok(SaveOutcome::Discarded));
        }
    }
}

struct Shared<D, B> {
    backend: B,
    on_error: Option<ErrorHandler>,
    state: Mutex<QueueState<D>>,
}

impl<D, B> Shared<D, B> {
    fn lock(&self) -> MutexGuard<'_, QueueState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Coalescing, deduplicating save queue for one document.
///
/// Cloning the queue yields another handle to the same state.
pub struct AutosaveQueue<D, B> {
    shared: Arc<Shared<D, B>>,
}

impl<D, B> Clone for AutosaveQueue<D, B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D, B> AutosaveQueue<D, B>
where
    D: Serialize + Clone + Send + 'static,
    B: SaveBackend<D>,
{
    /// Creates a queue writing through `backend`. Save failures are only
    /// logged and reported on the affected tickets.
    pub fn new(backend: B) -> Self {
        Self::build(backend, None)
    }

    /// Creates a queue that reports every rejected save to `on_error`.
    pub fn with_error_handler<F>(backend: B, on_error: F) -> Self
    where
        F: Fn(&TempoError) + Send + Sync + 'static,
    {
        Self::build(backend, Some(Box::new(on_error)))
    }

    fn build(backend: B, on_error: Option<ErrorHandler>) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                on_error,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Declares `document` as already persisted.
    ///
    /// Clears any pending intent (its tickets resolve as
    /// [`SaveOutcome::Discarded`]) and never triggers a save. A save already
    /// in flight still completes, but does not replace the seeded document.
    pub fn seed(&self, document: &D) -> Result<()> {
        let fingerprint = Fingerprint::of(document)?;
        let mut state = self.shared.lock();
        if let Some(pending) = state.pending.take() {
            settle(pending.waiters, || Ok(SaveOutcome::Discarded));
        }
        if let Some(in_flight) = state.in_flight.as_mut() {
            in_flight.reseeded = true;
        }
        state.last_seeded = Some((document.clone(), fingerprint));
        debug!("Autosave queue seeded (epoch {})", state.epoch);
        Ok(())
    }

    /// Records `document` as the newest intent.
    ///
    /// The returned ticket resolves when the document's effective save
    /// completes, which may be a later save of a newer intent.
    ///
    /// # Panics
    ///
    /// Panics if a save has to be dispatched outside a Tokio runtime.
    pub fn enqueue(&self, document: D) -> SaveTicket {
        let fingerprint = match Fingerprint::of(&document) {
            Ok(fingerprint) => fingerprint,
            Err(e) => return SaveTicket::ready(Err(e)),
        };
        let (waiter, ticket) = SaveTicket::channel();

        let mut guard = self.shared.lock();
        let state = &mut *guard;

        if let Some(in_flight) = state.in_flight.as_mut() {
            let mut waiters = state
                .pending
                .take()
                .map(|pending| pending.waiters)
                .unwrap_or_default();
            waiters.push(waiter);

            if in_flight.fingerprint == fingerprint {
                debug!("Intent matches the in-flight save; dropping pending intent");
                in_flight.waiters.extend(waiters);
            } else {
                debug!("Save in flight; coalescing intent into pending slot");
                state.pending = Some(Pending {
                    document,
                    fingerprint,
                    waiters,
                });
            }
            return ticket;
        }

        // Idle. Anything left pending here was retained after a failed save
        // and is superseded by this intent.
        state.pending = None;

        if state.matches_seeded(&fingerprint) {
            debug!("Intent matches last seeded document; skipping save");
            let _ = waiter.send(Ok(SaveOutcome::Unchanged));
            return ticket;
        }

        self.dispatch(state, document, fingerprint, vec![waiter]);
        ticket
    }

    /// Dispatches a pending intent that was retained after a failed save.
    ///
    /// This is the caller-driven retry: the queue itself never retries.
    /// While a save is in flight the ticket follows the newest intent.
    ///
    /// # Panics
    ///
    /// Panics if a save has to be dispatched outside a Tokio runtime.
    pub fn flush(&self) -> SaveTicket {
        let (waiter, ticket) = SaveTicket::channel();
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        let pending = state.pending.take();
        match (state.in_flight.is_some(), pending) {
            (true, Some(mut pending)) => {
                pending.waiters.push(waiter);
                state.pending = Some(pending);
            }
            (true, None) => {
                if let Some(in_flight) = state.in_flight.as_mut() {
                    in_flight.waiters.push(waiter);
                }
            }
            (false, Some(pending)) => {
                debug!("Flushing retained intent");
                let mut waiters = pending.waiters;
                waiters.push(waiter);
                self.dispatch(state, pending.document, pending.fingerprint, waiters);
            }
            (false, None) => {
                let _ = waiter.send(Ok(SaveOutcome::Unchanged));
            }
        }
        ticket
    }

    /// Forgets the pending intent, the seeded document and any in-flight
    /// result. In-flight network I/O is not aborted; its outcome is ignored.
    pub fn reset(&self) {
        let mut state = self.shared.lock();
        state.epoch += 1;
        state.last_seeded = None;
        state.discard_outstanding();
        debug!("Autosave queue reset (epoch {})", state.epoch);
    }

    /// Whether a backend call is currently awaited.
    pub fn is_in_flight(&self) -> bool {
        self.shared.lock().in_flight.is_some()
    }

    /// Whether an intent is waiting for dispatch (or was retained after a
    /// failure).
    pub fn has_pending(&self) -> bool {
        self.shared.lock().pending.is_some()
    }

    /// The pending intent, if any.
    pub fn pending(&self) -> Option<D> {
        self.shared
            .lock()
            .pending
            .as_ref()
            .map(|pending| pending.document.clone())
    }

    /// The last document known to match the backend.
    pub fn last_seeded(&self) -> Option<D> {
        self.shared
            .lock()
            .last_seeded
            .as_ref()
            .map(|(document, _)| document.clone())
    }

    /// Current reset generation.
    pub fn epoch(&self) -> u64 {
        self.shared.lock().epoch
    }

    fn dispatch(
        &self,
        state: &mut QueueState<D>,
        document: D,
        fingerprint: Fingerprint,
        waiters: Vec<Waiter>,
    ) {
        let epoch = state.epoch;
        state.in_flight = Some(InFlight {
            document: document.clone(),
            fingerprint,
            waiters,
            reseeded: false,
        });
        debug!("Dispatching save (epoch {epoch})");

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.drive(epoch, document).await });
    }
}

impl<D, B> Shared<D, B>
where
    D: Serialize + Clone + Send + 'static,
    B: SaveBackend<D>,
{
    /// Runs saves back to back until the pending slot is empty, the backend
    /// fails, or the queue is reset.
    async fn drive(&self, epoch: u64, mut document: D) {
        loop {
            let result = self.backend.save(document).await;

            let (next, failure) = {
                let mut guard = self.lock();
                let state = &mut *guard;
                if state.epoch != epoch {
                    warn!("Ignoring save completion from epoch {epoch}; queue was reset");
                    return;
                }
                let Some(in_flight) = state.in_flight.take() else {
                    return;
                };

                match result {
                    Ok(()) => (Self::complete(state, in_flight), None),
                    Err(err) => {
                        warn!("Save failed: {err}");
                        settle(in_flight.waiters, || Err(TempoError::save_failed(&err)));
                        match state.pending.as_mut() {
                            Some(pending) => settle(mem::take(&mut pending.waiters), || {
                                Err(TempoError::save_failed(&err))
                            }),
                            // Keep the rejected document so `flush` can retry it.
                            None => {
                                state.pending = Some(Pending {
                                    document: in_flight.document,
                                    fingerprint: in_flight.fingerprint,
                                    waiters: Vec::new(),
                                });
                            }
                        }
                        (None, Some(err))
                    }
                }
            };

            if let (Some(err), Some(on_error)) = (failure, self.on_error.as_ref()) {
                on_error(&err);
            }

            match next {
                Some(next) => document = next,
                None => return,
            }
        }
    }

    /// Records a confirmed save and promotes the pending intent, returning
    /// the next document to send.
    fn complete(state: &mut QueueState<D>, in_flight: InFlight<D>) -> Option<D> {
        settle(in_flight.waiters, || Ok(SaveOutcome::Saved));
        if in_flight.reseeded {
            debug!("Keeping document seeded during the completed save");
        } else {
            state.last_seeded = Some((in_flight.document, in_flight.fingerprint));
        }

        let pending = state.pending.take()?;
        if state.matches_seeded(&pending.fingerprint) {
            settle(pending.waiters, || Ok(SaveOutcome::Saved));
            return None;
        }

        debug!("Dispatching coalesced intent (epoch {})", state.epoch);
        let next = pending.document.clone();
        state.in_flight = Some(InFlight {
            document: pending.document,
            fingerprint: pending.fingerprint,
            waiters: pending.waiters,
            reseeded: false,
        });
        Some(next)
    }
}
