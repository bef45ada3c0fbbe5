//! Section-by-section view of a plan document.

use std::fmt;

use crate::{models::PlanDocument, reconcile::ReconcileReport};

/// A plan rendered as one markdown heading per section with its instance ids.
///
/// Attach a [`ReconcileReport`] to append what normalization repaired.
pub struct NormalizedPlan<'a> {
    pub document: &'a PlanDocument,
    pub report: Option<&'a ReconcileReport>,
}

impl<'a> NormalizedPlan<'a> {
    pub fn new(document: &'a PlanDocument) -> Self {
        Self {
            document,
            report: None,
        }
    }

    pub fn with_report(mut self, report: &'a ReconcileReport) -> Self {
        self.report = Some(report);
        self
    }
}

impl fmt::Display for NormalizedPlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = self.document.sections();
        if sections.is_empty() {
            writeln!(f, "No sections in this plan.")?;
        }

        for (index, section) in sections.iter().enumerate() {
            if section.name.is_empty() {
                writeln!(f, "## Section {}", index + 1)?;
            } else {
                writeln!(f, "## {}", section.name)?;
            }
            writeln!(f)?;

            if section.activity_ids.is_empty() {
                writeln!(f, "No activities.")?;
            }
            for id in &section.activity_ids {
                writeln!(f, "- {id}")?;
            }
            if section.has_legacy_items() {
                let waiting = section.legacy_items().count();
                writeln!(f, "- *{waiting} unresolved legacy item(s)*")?;
            }
            writeln!(f)?;
        }

        if let Some(report) = self.report {
            writeln!(f, "### Reconciliation")?;
            writeln!(f)?;
            writeln!(f, "- Kept: {}", report.kept)?;
            writeln!(f, "- Stale ids removed: {}", report.stale_ids_removed)?;
            writeln!(f, "- Resolved by instance id: {}", report.resolved_by_instance)?;
            writeln!(f, "- Resolved by definition: {}", report.resolved_by_definition)?;
            writeln!(f, "- Legacy items dropped: {}", report.legacy_dropped)?;
            writeln!(f, "- Assigned to lone section: {}", report.fallback_assigned)?;
            writeln!(f, "- Unassigned: {}", report.unassigned)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{InstanceId, Section};

    #[test]
    fn test_sections_and_ids_are_listed() {
        let plan = PlanDocument::with_sections(vec![
            Section::new("Warm-up", vec![InstanceId::from("i1")]),
            Section::new("", vec![]),
        ]);
        let output = NormalizedPlan::new(&plan).to_string();

        assert!(output.contains("## Warm-up\n\n- i1\n"));
        assert!(output.contains("## Section 2\n\nNo activities.\n"));
        assert!(!output.contains("Reconciliation"));
    }

    #[test]
    fn test_report_and_legacy_items_are_shown() {
        let plan: PlanDocument = serde_json::from_value(json!({
            "sections": [{"name": "Main", "exercises": [{"activity_id": "row"}]}]
        }))
        .unwrap();
        let report = ReconcileReport {
            legacy_dropped: 1,
            ..Default::default()
        };
        let output = NormalizedPlan::new(&plan).with_report(&report).to_string();

        assert!(output.contains("*1 unresolved legacy item(s)*"));
        assert!(output.contains("- Legacy items dropped: 1"));
    }

    #[test]
    fn test_document_without_sections() {
        let output = NormalizedPlan::new(&PlanDocument::default()).to_string();
        assert_eq!(output, "No sections in this plan.\n");
    }
}
