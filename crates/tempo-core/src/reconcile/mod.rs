//! Section/activity reconciliation.
//!
//! A plan document may reference activities in several historical shapes:
//! canonical `activity_ids`, legacy `exercises`/`activities` entries that name
//! an instance, or entries that only name an activity definition. [`normalize`]
//! repairs a document against the authoritative instance list so that every
//! section holds only existing instance ids and no instance belongs to two
//! sections.
//!
//! The repair is best effort and never fails. It is deterministic and
//! idempotent, so it can run on every load and every instance-list change.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use tempo_core::{
//!     models::{ActivityInstance, InstanceId, PlanDocument},
//!     reconcile::normalize,
//! };
//!
//! let plan: PlanDocument = serde_json::from_value(json!({
//!     "sections": [{"activity_ids": [], "exercises": [{"activity_id": "def-A"}]}]
//! }))
//! .unwrap();
//! let instances = vec![ActivityInstance::new("i1", "def-A")];
//!
//! let normalized = normalize(&plan, &instances);
//! assert_eq!(normalized.sections()[0].activity_ids, vec![InstanceId::from("i1")]);
//! ```

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::models::{ActivityInstance, DefinitionId, InstanceId, PlanDocument, Section};

mod report;


pub use report::ReconcileReport;

/// Read-only view of the authoritative instance list.
struct InstanceIndex<'a> {
    /// Instance ids in list order
    ordered: Vec<&'a InstanceId>,
    known: HashSet<&'a InstanceId>,
    by_definition: HashMap<&'a DefinitionId, Vec<&'a InstanceId>>,
}

impl<'a> InstanceIndex<'a> {
    fn new(instances: &'a [ActivityInstance]) -> Self {
        let mut by_definition: HashMap<&DefinitionId, Vec<&InstanceId>> = HashMap::new();
        for instance in instances {
            by_definition
                .entry(&instance.activity_definition_id)
                .or_default()
                .push(&instance.id);
        }

        Self {
            ordered: instances.iter().map(|i| &i.id).collect(),
            known: instances.iter().map(|i| &i.id).collect(),
            by_definition,
        }
    }

    fn contains(&self, id: &InstanceId) -> bool {
        self.known.contains(id)
    }

    /// First instance of `definition` that is not yet used.
    fn first_unused(
        &self,
        definition: &DefinitionId,
        used: &HashSet<InstanceId>,
    ) -> Option<&'a InstanceId> {
        self.by_definition
            .get(definition)?
            .iter()
            .copied()
            .find(|id| !used.contains(*id))
    }
}

/// Normalizes `document` against the authoritative `instances`.
pub fn normalize(document: &PlanDocument, instances: &[ActivityInstance]) -> PlanDocument {
    normalize_with_report(document, instances).0
}

/// Like [`normalize`], also returning what the repair did.
pub fn normalize_with_report(
    document: &PlanDocument,
    instances: &[ActivityInstance],
) -> (PlanDocument, ReconcileReport) {
    let mut report = ReconcileReport::default();
    let Some(sections) = document.sections.as_ref() else {
        return (document.clone(), report);
    };

    let index = InstanceIndex::new(instances);
    let mut used: HashSet<InstanceId> = HashSet::new();

    let mut normalized: Vec<Section> = sections
        .iter()
        .map(|section| reconcile_section(section, &index, &mut used, &mut report))
        .collect();

    if let [only] = normalized.as_mut_slice() {
        if only.activity_ids.is_empty() {
            only.activity_ids = index
                .ordered
                .iter()
                .filter(|id| !used.contains(**id))
                .map(|id| (*id).clone())
                .collect();
            report.fallback_assigned = only.activity_ids.len();
            used.extend(only.activity_ids.iter().cloned());
        }
    }

    // Legacy entries are consumed once their section resolved to something;
    // an empty section keeps them for a later instance list.
    for section in &mut normalized {
        if !section.activity_ids.is_empty() {
            section.exercises.clear();
            section.activities.clear();
        }
    }

    report.unassigned = index
        .ordered
        .iter()
        .filter(|id| !used.contains(**id))
        .count();
    debug!("Reconciled plan: {report}");

    let mut document = document.clone();
    document.sections = Some(normalized);
    (document, report)
}

fn reconcile_section(
    section: &Section,
    index: &InstanceIndex<'_>,
    used: &mut HashSet<InstanceId>,
    report: &mut ReconcileReport,
) -> Section {
    let mut assigned = Vec::new();
    for id in &section.activity_ids {
        if index.contains(id) && used.insert(id.clone()) {
            assigned.push(id.clone());
        } else {
            report.stale_ids_removed += 1;
        }
    }
    report.kept += assigned.len();

    if assigned.is_empty() && section.has_legacy_items() {
        assigned = resolve_legacy(section, index, used, report);
    }

    Section {
        activity_ids: assigned,
        ..section.clone()
    }
}

/// Resolves legacy entries in two passes: explicit instance references
/// first, then definition lookups for whatever is left.
fn resolve_legacy(
    section: &Section,
    index: &InstanceIndex<'_>,
    used: &mut HashSet<InstanceId>,
    report: &mut ReconcileReport,
) -> Vec<InstanceId> {
    let items: Vec<_> = section.legacy_items().collect();
    let mut resolved: Vec<Option<InstanceId>> = vec![None; items.len()];

    for (slot, item) in resolved.iter_mut().zip(&items) {
        if let Some(id) = item.instance_ref() {
            if index.contains(&id) && used.insert(id.clone()) {
                report.resolved_by_instance += 1;
                *slot = Some(id);
            }
        }
    }

    for (slot, item) in resolved.iter_mut().zip(&items) {
        if slot.is_some() {
            continue;
        }
        let candidate = item
            .definition_ref()
            .and_then(|definition| index.first_unused(&definition, used));
        match candidate {
            Some(id) => {
                used.insert(id.clone());
                report.resolved_by_definition += 1;
                *slot = Some(id.clone());
            }
            None => report.legacy_dropped += 1,
        }
    }

    resolved.into_iter().flatten().collect()
}
