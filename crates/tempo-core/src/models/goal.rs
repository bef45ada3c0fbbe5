//! Goal and target models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DefinitionId, GoalId, TargetId};

/// A goal made of targets and, optionally, child goals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Goal {
    pub id: GoalId,

    #[serde(default)]
    pub name: String,

    /// Leaf-level conditions belonging to this goal
    #[serde(default)]
    pub targets: Vec<Target>,

    /// Child goals that must also be satisfied
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<GoalId>,

    /// Explicitly marked complete by the backend
    #[serde(default)]
    pub completed: bool,

    /// The goal was already satisfied before this editing session began
    #[serde(default)]
    pub was_already_completed_at_load: bool,
}

/// A measurable condition attached to a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Target {
    pub id: TargetId,

    /// Restricts matching instances to one activity definition
    #[serde(
        default,
        alias = "activityDefinitionId",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_definition_id: Option<DefinitionId>,

    /// All conditions must hold on a single instance
    #[serde(default)]
    pub conditions: Vec<MetricCondition>,

    /// The target was already satisfied before this editing session began
    #[serde(default)]
    pub was_already_completed_at_load: bool,
}

/// A threshold on one metric of an activity instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricCondition {
    pub metric_id: String,
    pub comparison: Comparison,
    pub value: f64,
}

impl MetricCondition {
    /// Whether an observed metric value meets this condition.
    pub fn holds(&self, observed: f64) -> bool {
        self.comparison.compare(observed, self.value)
    }
}

/// Comparison operator of a metric condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Observed value is at least the threshold
    #[default]
    Gte,
    /// Observed value is at most the threshold
    Lte,
    Gt,
    Lt,
    /// Observed value equals the threshold (within `f64::EPSILON`)
    Eq,
}

impl Comparison {
    /// Applies the operator as `observed <op> threshold`.
    pub fn compare(self, observed: f64, threshold: f64) -> bool {
        match self {
            Comparison::Gte => observed >= threshold,
            Comparison::Lte => observed <= threshold,
            Comparison::Gt => observed > threshold,
            Comparison::Lt => observed < threshold,
            Comparison::Eq => (observed - threshold).abs() < f64::EPSILON,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Eq => "==",
        }
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gte" | ">=" => Ok(Comparison::Gte),
            "lte" | "<=" => Ok(Comparison::Lte),
            "gt" | ">" => Ok(Comparison::Gt),
            "lt" | "<" => Ok(Comparison::Lt),
            "eq" | "==" | "=" => Ok(Comparison::Eq),
            _ => Err(format!("Invalid comparison: {s}")),
        }
    }
}
