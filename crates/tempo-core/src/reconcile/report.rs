//! Summary of what a normalization pass changed.

use std::fmt;

use serde::Serialize;

/// Counters collected while normalizing one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Existing section references that were still valid
    pub kept: usize,
    /// Existing references dropped as unknown or already used elsewhere
    pub stale_ids_removed: usize,
    /// Legacy entries matched through an explicit instance id
    pub resolved_by_instance: usize,
    /// Legacy entries matched through their activity definition
    pub resolved_by_definition: usize,
    /// Legacy entries that matched no available instance
    pub legacy_dropped: usize,
    /// Instances given to a lone empty section
    pub fallback_assigned: usize,
    /// Instances that ended up in no section
    pub unassigned: usize,
}

impl ReconcileReport {
    /// Whether the pass only confirmed existing references.
    pub fn is_clean(&self) -> bool {
        self.stale_ids_removed == 0
            && self.resolved_by_instance == 0
            && self.resolved_by_definition == 0
            && self.fallback_assigned == 0
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kept {}, removed {}, by instance {}, by definition {}, dropped {}, fallback {}, unassigned {}",
            self.kept,
            self.stale_ids_removed,
            self.resolved_by_instance,
            self.resolved_by_definition,
            self.legacy_dropped,
            self.fallback_assigned,
            self.unassigned,
        )
    }
}
