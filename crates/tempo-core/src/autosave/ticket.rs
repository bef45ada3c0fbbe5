//! Completion handle returned by every enqueue.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot;

use crate::error::Result;

/// How an enqueued document was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The backend confirmed a save covering this document, either the
    /// document itself or a newer intent that superseded it.
    Saved,
    /// The document already matched the backend state; nothing was sent.
    Unchanged,
    /// The queue was reset or reseeded before the document was persisted.
    Discarded,
}

pub(crate) type Waiter = oneshot::Sender<Result<SaveOutcome>>;

/// Resolves a batch of waiters with a shared outcome.
pub(crate) fn settle(waiters: Vec<Waiter>, mut outcome: impl FnMut() -> Result<SaveOutcome>) {
    for waiter in waiters {
        // A dropped ticket means nobody is waiting for this outcome.
        let _ = waiter.send(outcome());
    }
}

/// Future that resolves once an enqueued document's effective save settles.
///
/// Dropping the ticket does not cancel anything; the queue keeps working on
/// the document.
#[must_use = "a ticket does nothing unless awaited; drop it to ignore the outcome"]
#[derive(Debug)]
pub struct SaveTicket {
    rx: oneshot::Receiver<Result<SaveOutcome>>,
}

impl SaveTicket {
    pub(crate) fn channel() -> (Waiter, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A ticket that is already settled.
    pub(crate) fn ready(result: Result<SaveOutcome>) -> Self {
        let (tx, ticket) = Self::channel();
        let _ = tx.send(result);
        ticket
    }
}

impl Future for SaveTicket {
    type Output = Result<SaveOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            // The sender only disappears when the driving task is torn down.
            .map(|received| received.unwrap_or(Ok(SaveOutcome::Discarded)))
    }
}
