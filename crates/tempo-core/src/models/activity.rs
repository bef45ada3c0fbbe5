//! Activity instance model (authoritative, owned by the backend).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DefinitionId, InstanceId};

/// A materialized activity record in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityInstance {
    /// Backend-assigned identifier
    pub id: InstanceId,

    /// Definition this instance was created from
    #[serde(alias = "activityDefinitionId")]
    pub activity_definition_id: DefinitionId,

    /// Recorded metric values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<MetricValue>,

    /// Whether the instance was marked done
    #[serde(default)]
    pub completed: bool,

    /// Fields the core does not inspect
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActivityInstance {
    /// Creates an instance with no metrics.
    pub fn new(id: impl Into<InstanceId>, definition: impl Into<DefinitionId>) -> Self {
        Self {
            id: id.into(),
            activity_definition_id: definition.into(),
            metrics: Vec::new(),
            completed: false,
            extra: Map::new(),
        }
    }

    /// Adds a metric value.
    pub fn with_metric(mut self, metric_id: impl Into<String>, value: f64) -> Self {
        self.metrics.push(MetricValue {
            metric_id: metric_id.into(),
            value,
        });
        self
    }

    /// Marks the instance completed.
    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Value recorded for a metric, if any.
    pub fn metric(&self, metric_id: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.metric_id == metric_id)
            .map(|m| m.value)
    }
}

/// A single recorded metric on an activity instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricValue {
    pub metric_id: String,
    pub value: f64,
}
