//! One-shot achievement notifications from recomputed satisfaction sets.
//!
//! Satisfaction is recomputed whenever instances or goals change, possibly
//! many times per second while metrics are edited. The
//! [`AchievementTracker`] owns the previous snapshot for each domain and turns
//! consecutive snapshots into transitions:
//!
//! ```text
//! Unsatisfied ──achieved──▶ Satisfied
//!      ▲                        │
//!      └────────reverted────────┘
//! ```
//!
//! Steady states emit nothing, so repeated recomputation with the same
//! result never produces duplicate notifications. The emitted events are the
//! only interface notification side effects should be driven from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{ActivityInstance, Goal, GoalId, TargetId};

mod events;
pub mod satisfaction;


pub use events::{AchievementEvent, CollectingSink, LogSink, NotificationSink};
pub use satisfaction::{target_satisfied, SatisfactionSnapshot};

/// Transitions between two consecutive snapshots of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transitions<Id> {
    /// Newly satisfied ids, sorted
    pub achieved: Vec<Id>,
    /// Newly unsatisfied ids, sorted
    pub reverted: Vec<Id>,
}

impl<Id> Default for Transitions<Id> {
    fn default() -> Self {
        Self {
            achieved: Vec::new(),
            reverted: Vec::new(),
        }
    }
}

impl<Id> Transitions<Id> {
    pub fn is_empty(&self) -> bool {
        self.achieved.is_empty() && self.reverted.is_empty()
    }
}

/// Set difference in both directions: `achieved = current - previous`,
/// `reverted = previous - current`.
pub fn diff<Id: Ord + Clone>(current: &BTreeSet<Id>, previous: &BTreeSet<Id>) -> Transitions<Id> {
    Transitions {
        achieved: current.difference(previous).cloned().collect(),
        reverted: previous.difference(current).cloned().collect(),
    }
}

/// Previous snapshot of one domain plus load-time suppression state.
#[derive(Debug, Clone)]
struct DomainState<Id> {
    previous: BTreeSet<Id>,
    /// Preloaded ids that reverted during this session and may notify again
    released: BTreeSet<Id>,
}

impl<Id> Default for DomainState<Id> {
    fn default() -> Self {
        Self {
            previous: BTreeSet::new(),
            released: BTreeSet::new(),
        }
    }
}

impl<Id: Ord + Clone> DomainState<Id> {
    fn advance(&mut self, current: BTreeSet<Id>, preloaded: &BTreeSet<Id>) -> Transitions<Id> {
        let mut transitions = diff(&current, &self.previous);
        self.released.extend(transitions.reverted.iter().cloned());
        transitions
            .achieved
            .retain(|id| !preloaded.contains(id) || self.released.contains(id));
        self.previous = current;
        transitions
    }
}

/// Transitions for both domains from one recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementEvents {
    pub targets: Transitions<TargetId>,
    pub goals: Transitions<GoalId>,
}

impl AchievementEvents {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.goals.is_empty()
    }

    /// Flattens the transitions into individual events, targets first.
    pub fn events(&self) -> Vec<AchievementEvent> {
        let targets = &self.targets;
        let goals = &self.goals;
        targets
            .achieved
            .iter()
            .cloned()
            .map(AchievementEvent::TargetAchieved)
            .chain(targets.reverted.iter().cloned().map(AchievementEvent::TargetReverted))
            .chain(goals.achieved.iter().cloned().map(AchievementEvent::GoalAchieved))
            .chain(goals.reverted.iter().cloned().map(AchievementEvent::GoalReverted))
            .collect()
    }
}

/// Everything the tracker needs to continue where it left off.
///
/// Serializes as the satisfied sets, plus a `released` entry once a
/// preloaded id has reverted during the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerState {
    #[serde(flatten)]
    pub satisfied: SatisfactionSnapshot,
    /// Preloaded ids that reverted and may report "achieved" again
    #[serde(default, skip_serializing_if = "SatisfactionSnapshot::is_empty")]
    pub released: SatisfactionSnapshot,
}

/// Single owner of the previous satisfied sets.
///
/// Call [`update`](Self::update) once per recomputation cycle.
#[derive(Debug, Clone, Default)]
pub struct AchievementTracker {
    targets: DomainState<TargetId>,
    goals: DomainState<GoalId>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a known previous snapshot instead of an empty one.
    pub fn from_snapshot(snapshot: SatisfactionSnapshot) -> Self {
        Self::from_state(TrackerState {
            satisfied: snapshot,
            released: SatisfactionSnapshot::default(),
        })
    }

    /// Resumes from a state saved with [`state`](Self::state).
    pub fn from_state(state: TrackerState) -> Self {
        Self {
            targets: DomainState {
                previous: state.satisfied.targets,
                released: state.released.targets,
            },
            goals: DomainState {
                previous: state.satisfied.goals,
                released: state.released.goals,
            },
        }
    }

    /// Recomputes satisfaction and returns the transitions since the last
    /// call. Ids flagged `was_already_completed_at_load` do not report
    /// "achieved" until they have reverted once in this session.
    pub fn update(&mut self, instances: &[ActivityInstance], goals: &[Goal]) -> AchievementEvents {
        self.apply(SatisfactionSnapshot::evaluate(instances, goals), goals)
    }

    /// Diffs an already computed snapshot.
    pub fn apply(&mut self, snapshot: SatisfactionSnapshot, goals: &[Goal]) -> AchievementEvents {
        let preloaded_targets: BTreeSet<TargetId> = goals
            .iter()
            .flat_map(|goal| goal.targets.iter())
            .filter(|target| target.was_already_completed_at_load)
            .map(|target| target.id.clone())
            .collect();
        let preloaded_goals: BTreeSet<GoalId> = goals
            .iter()
            .filter(|goal| goal.was_already_completed_at_load)
            .map(|goal| goal.id.clone())
            .collect();

        AchievementEvents {
            targets: self.targets.advance(snapshot.targets, &preloaded_targets),
            goals: self.goals.advance(snapshot.goals, &preloaded_goals),
        }
    }

    pub fn satisfied_targets(&self) -> &BTreeSet<TargetId> {
        &self.targets.previous
    }

    pub fn satisfied_goals(&self) -> &BTreeSet<GoalId> {
        &self.goals.previous
    }

    pub fn is_target_satisfied(&self, id: &TargetId) -> bool {
        self.targets.previous.contains(id)
    }

    pub fn is_goal_satisfied(&self, id: &GoalId) -> bool {
        self.goals.previous.contains(id)
    }

    /// The current snapshot, for persisting between CLI runs.
    pub fn snapshot(&self) -> SatisfactionSnapshot {
        SatisfactionSnapshot {
            targets: self.targets.previous.clone(),
            goals: self.goals.previous.clone(),
        }
    }

    /// The satisfied sets together with the load-time suppression history.
    pub fn state(&self) -> TrackerState {
        TrackerState {
            satisfied: self.snapshot(),
            released: SatisfactionSnapshot {
                targets: self.targets.released.clone(),
                goals: self.goals.released.clone(),
            },
        }
    }

    /// Forgets all history, as when a different session is opened.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
