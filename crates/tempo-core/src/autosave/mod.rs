//! Optimistic autosave: coalescing, deduplicating, order-preserving saves.
//!
//! The [`AutosaveQueue`] owns one logical "current intent" and at most one
//! in-flight backend call. Rapid edits collapse into the newest value, edits
//! that match what the backend already holds are dropped, and a save that
//! started later never carries an older state than one that started before
//! it.
//!
//! ```text
//!   enqueue(d1) ──▶ save(d1) ─────────────┐
//!   enqueue(d2) ──▶ pending = d2          │ resolves
//!   enqueue(d3) ──▶ pending = d3 (d2 folded)
//!                                         ▼
//!                                    save(d3) ──▶ idle
//! ```
//!
//! Debouncing the trigger is a separate policy, provided by [`Debouncer`].
//!
//! # Examples
//!
//! ```rust
//! use serde_json::{json, Value};
//! use tempo_core::autosave::{AutosaveQueue, SaveOutcome};
//!
//! # async fn example() -> tempo_core::Result<()> {
//! let queue = AutosaveQueue::new(|doc: Value| async move {
//!     println!("persisting {doc}");
//!     Ok::<(), tempo_core::TempoError>(())
//! });
//!
//! queue.seed(&json!({"v": 0}))?;
//! assert_eq!(queue.enqueue(json!({"v": 0})).await?, SaveOutcome::Unchanged);
//! assert_eq!(queue.enqueue(json!({"v": 1})).await?, SaveOutcome::Saved);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::error::Result;

pub mod debounce;
mod queue;
mod ticket;

#[cfg(test)]
mod tests;

pub use debounce::Debouncer;
pub use queue::AutosaveQueue;
pub use ticket::{SaveOutcome, SaveTicket};

/// The persistence capability the queue writes through.
#[async_trait]
pub trait SaveBackend<D>: Send + Sync + 'static {
    /// Persists `document`. A rejection is reported to the queue's error
    /// handler and never retried automatically.
    async fn save(&self, document: D) -> Result<()>;
}

#[async_trait]
impl<D, F, Fut> SaveBackend<D> for F
where
    D: Send + 'static,
    F: Fn(D) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn save(&self, document: D) -> Result<()> {
        (self)(document).await
    }
}
