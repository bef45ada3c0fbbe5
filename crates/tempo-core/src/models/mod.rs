//! Data models for session plans, activity instances and goals.
//!
//! The plan document is the unit exchanged with the backend. Apart from the
//! section-to-activity mapping it is treated as opaque JSON: unknown fields
//! are kept in `extra` maps so a document survives normalization and saving
//! without losing data the core does not understand.
//!
//! # Examples
//!
//! ```rust
//! use tempo_core::models::{ActivityInstance, InstanceId, PlanDocument, Section};
//!
//! let plan = PlanDocument::with_sections(vec![Section::new(
//!     "Warm-up",
//!     vec![InstanceId::from("i1")],
//! )]);
//! assert_eq!(plan.assigned_ids().count(), 1);
//!
//! let instance = ActivityInstance::new("i1", "squat").with_metric("reps", 5.0);
//! assert_eq!(instance.metric("reps"), Some(5.0));
//! ```

pub mod activity;
pub mod goal;
pub mod ids;
pub mod plan;
pub mod session;


pub use activity::{ActivityInstance, MetricValue};
pub use goal::{Comparison, Goal, MetricCondition, Target};
pub use ids::{DefinitionId, GoalId, InstanceId, TargetId};
pub use plan::{LegacyPlanItem, PlanDocument, Section};
pub use session::{SessionRecord, StoredSession};
