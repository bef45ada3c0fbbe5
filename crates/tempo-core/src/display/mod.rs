//! Markdown display wrappers for plans, sessions and achievements.
//!
//! Domain types keep their own terse `Display` (ids, events, reconcile
//! reports). The wrappers here add the context-specific layout used by the
//! CLI: headers, metadata lists and empty-collection messages, all as
//! markdown for the terminal renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Display Wrappers│    │   Formatted     │
//! │ (PlanDocument,  │───▶│ (NormalizedPlan,│───▶│    Output       │
//! │  SessionRecord) │    │  SessionList..) │    │   (markdown)    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust
//! use tempo_core::{
//!     display::{NormalizedPlan, OperationStatus},
//!     models::{InstanceId, PlanDocument, Section},
//! };
//!
//! let plan = PlanDocument::with_sections(vec![Section::new(
//!     "Warm-up",
//!     vec![InstanceId::from("i1")],
//! )]);
//! let output = NormalizedPlan::new(&plan).to_string();
//! assert!(output.contains("## Warm-up"));
//! assert!(output.contains("- i1"));
//!
//! let status = OperationStatus::success("Session saved".to_string());
//! assert!(status.to_string().starts_with("Success:"));
//! ```

pub mod achievements;
pub mod datetime;
pub mod plan;
pub mod sessions;
pub mod status;

pub use achievements::AchievementSummary;
pub use datetime::LocalDateTime;
pub use plan::NormalizedPlan;
pub use sessions::{SessionDetails, SessionList};
pub use status::OperationStatus;
