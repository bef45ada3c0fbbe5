//! Plan document model: the editable session plan and its sections.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use super::{DefinitionId, InstanceId};

/// The editable session plan exchanged with the backend.
///
/// Only `sections` is interpreted by the core; every other field is carried
/// through `extra` untouched. A document without a `sections` key keeps that
/// shape when serialized back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanDocument {
    /// Ordered sections of the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,

    /// Fields the core does not inspect
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanDocument {
    /// Creates a document with the given sections and no extra fields.
    pub fn with_sections(sections: Vec<Section>) -> Self {
        Self {
            sections: Some(sections),
            extra: Map::new(),
        }
    }

    /// Sections of the plan, empty when the document carries none.
    pub fn sections(&self) -> &[Section] {
        self.sections.as_deref().unwrap_or_default()
    }

    /// Every instance id referenced by any section, in section order.
    pub fn assigned_ids(&self) -> impl Iterator<Item = &InstanceId> {
        self.sections().iter().flat_map(|s| s.activity_ids.iter())
    }
}

/// A named group of activities within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Section {
    /// Opaque section identifier or index as provided by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Display name of the section
    #[serde(default)]
    pub name: String,

    /// Canonical, ordered list of activity instances in this section
    #[serde(default, alias = "activityIds", deserialize_with = "null_as_empty")]
    pub activity_ids: Vec<InstanceId>,

    /// Planned duration of the section in minutes, kept exactly as given
    #[serde(
        default,
        alias = "estimatedDurationMinutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_duration_minutes: Option<Number>,

    /// Legacy entries from older plan formats
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub exercises: Vec<LegacyPlanItem>,

    /// Legacy entries from older plan formats
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub activities: Vec<LegacyPlanItem>,

    /// Fields the core does not inspect
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    /// Creates a section holding the given instance ids.
    pub fn new(name: impl Into<String>, activity_ids: Vec<InstanceId>) -> Self {
        Self {
            name: name.into(),
            activity_ids,
            ..Default::default()
        }
    }

    /// Legacy items in resolution order (`exercises` first, then
    /// `activities`).
    pub fn legacy_items(&self) -> impl Iterator<Item = &LegacyPlanItem> {
        self.exercises.iter().chain(self.activities.iter())
    }

    /// Whether the section still carries unconsumed legacy entries.
    pub fn has_legacy_items(&self) -> bool {
        !self.exercises.is_empty() || !self.activities.is_empty()
    }
}

/// A section entry in one of the pre-normalization shapes.
///
/// The raw JSON is kept verbatim so an unresolved entry serializes back
/// exactly as it arrived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct LegacyPlanItem(pub Value);

/// Keys that carry a definition id directly on a legacy entry.
const DEFINITION_KEYS: [&str; 3] = ["activity_definition_id", "activity_id", "definition_id"];

/// Nested objects whose `id` is a definition id.
const NESTED_DEFINITION_KEYS: [&str; 2] = ["activity", "activity_definition"];

impl LegacyPlanItem {
    /// Explicit instance reference: a bare id or an `instance_id` field.
    pub fn instance_ref(&self) -> Option<InstanceId> {
        match &self.0 {
            Value::Object(map) => map.get("instance_id").and_then(id_text).map(InstanceId::from),
            other => id_text(other).map(InstanceId::from),
        }
    }

    /// Definition-level reference, checked in a fixed key order.
    pub fn definition_ref(&self) -> Option<DefinitionId> {
        let Value::Object(map) = &self.0 else {
            return None;
        };

        DEFINITION_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(id_text))
            .or_else(|| {
                NESTED_DEFINITION_KEYS.iter().find_map(|key| {
                    map.get(*key)
                        .and_then(|nested| nested.get("id"))
                        .and_then(id_text)
                })
            })
            .map(DefinitionId::from)
    }
}

/// Treats an explicit `null` list as an empty one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads an identifier that may be encoded as a string or a number.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
