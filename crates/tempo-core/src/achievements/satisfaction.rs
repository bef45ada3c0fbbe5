//! Evaluation of target and goal satisfaction from current data.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{ActivityInstance, Goal, GoalId, Target, TargetId};

/// Ids currently satisfied in each domain. Recomputed, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionSnapshot {
    #[serde(default)]
    pub targets: BTreeSet<TargetId>,
    #[serde(default)]
    pub goals: BTreeSet<GoalId>,
}

impl SatisfactionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.goals.is_empty()
    }

    /// Evaluates every target and goal against the given instances.
    pub fn evaluate(instances: &[ActivityInstance], goals: &[Goal]) -> Self {
        let targets: BTreeSet<TargetId> = goals
            .iter()
            .flat_map(|goal| goal.targets.iter())
            .filter(|target| target_satisfied(target, instances))
            .map(|target| target.id.clone())
            .collect();

        let by_id: HashMap<&GoalId, &Goal> = goals.iter().map(|g| (&g.id, g)).collect();
        let mut memo = HashMap::new();
        let satisfied_goals = goals
            .iter()
            .filter(|goal| goal_satisfied(&goal.id, &by_id, &targets, &mut memo))
            .map(|goal| goal.id.clone())
            .collect();

        Self {
            targets,
            goals: satisfied_goals,
        }
    }
}

/// Whether some single instance meets every condition of `target`.
///
/// Only instances of the target's definition are considered when it names
/// one. A target without conditions is met by a completed instance.
pub fn target_satisfied(target: &Target, instances: &[ActivityInstance]) -> bool {
    instances
        .iter()
        .filter(|instance| {
            target
                .activity_definition_id
                .as_ref()
                .map_or(true, |def| *def == instance.activity_definition_id)
        })
        .any(|instance| {
            if target.conditions.is_empty() {
                return instance.completed;
            }
            target.conditions.iter().all(|condition| {
                instance
                    .metric(&condition.metric_id)
                    .is_some_and(|observed| condition.holds(observed))
            })
        })
}

/// Goal evaluation with memoization. `None` in the memo marks a goal on the
/// current path, so a cycle evaluates as unsatisfied.
fn goal_satisfied<'a>(
    id: &'a GoalId,
    goals: &HashMap<&'a GoalId, &'a Goal>,
    targets: &BTreeSet<TargetId>,
    memo: &mut HashMap<&'a GoalId, Option<bool>>,
) -> bool {
    match memo.get(id) {
        Some(Some(known)) => return *known,
        Some(None) => return false,
        None => {}
    }
    let Some(goal) = goals.get(id).copied() else {
        return false;
    };

    memo.insert(id, None);
    let has_requirements = !goal.targets.is_empty() || !goal.child_ids.is_empty();
    let satisfied = has_requirements
        && goal.targets.iter().all(|t| targets.contains(&t.id))
        && goal.child_ids.iter().all(|child| {
            goals.get(child).is_some_and(|c| c.completed)
                || goal_satisfied(child, goals, targets, memo)
        });
    memo.insert(id, Some(satisfied));
    satisfied
}
