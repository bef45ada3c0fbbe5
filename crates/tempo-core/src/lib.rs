//! Core library for Tempo, the session-plan edit core.
//!
//! This crate keeps an edited session plan consistent with the backend while
//! the user changes it: edits are saved through a coalescing autosave queue,
//! plans are reconciled against the authoritative activity instances, and
//! goal progress is turned into one-shot achievement notifications.
//!
//! # Architecture
//!
//! - **Models** ([`models`]): plan documents, activity instances, goals
//! - **Equality** ([`equality`]): order-independent fingerprints used for
//!   save deduplication
//! - **Autosave** ([`autosave`]): the save queue and its debouncer
//! - **Reconciliation** ([`reconcile`]): plan repair against instances
//! - **Achievements** ([`achievements`]): satisfaction and transition diffs
//! - **Session** ([`session`]): the editor that ties the above together
//! - **Storage** ([`store`], [`db`]): SQLite persistence for the CLI
//! - **Display** ([`display`]): markdown formatting for terminal output
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tempo_core::{
//!     models::{ActivityInstance, PlanDocument, Section},
//!     SessionEditor, StoreBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("tempo.db"))
//!     .build()
//!     .await?;
//!
//! let mut editor = SessionEditor::builder(store.session("monday")).build();
//! let plan = PlanDocument::with_sections(vec![Section::new("Main", vec![])]);
//! editor
//!     .load(plan, vec![ActivityInstance::new("i1", "squat")])?
//!     .await?;
//!
//! println!("{}", tempo_core::display::NormalizedPlan::new(editor.document()));
//! # Ok(())
//! # }
//! ```

pub mod achievements;
pub mod autosave;
pub mod db;
pub mod display;
pub mod equality;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use achievements::{
    AchievementEvent, AchievementEvents, AchievementTracker, NotificationSink, TrackerState,
};
pub use autosave::{AutosaveQueue, Debouncer, SaveBackend, SaveOutcome, SaveTicket};
pub use db::Database;
pub use error::{Result, TempoError};
pub use reconcile::{normalize, normalize_with_report, ReconcileReport};
pub use session::{SessionEditor, SessionEditorBuilder};
pub use store::{DeleteSession, DocumentStore, SessionStore, StoreBuilder};
