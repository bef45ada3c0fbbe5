//! Stored session listings and details.

use std::{fmt, ops::Index};

use super::{datetime::LocalDateTime, plan::NormalizedPlan};
use crate::models::{SessionRecord, StoredSession};

/// Newtype wrapper for displaying stored session metadata.
///
/// # Examples
///
/// ```rust
/// use jiff::Timestamp;
/// use tempo_core::{display::SessionList, models::SessionRecord};
///
/// let record = SessionRecord {
///     id: "monday".to_string(),
///     revision: 3,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
/// let output = SessionList(vec![record]).to_string();
/// assert!(output.contains("## monday (revision 3)"));
/// ```
pub struct SessionList(pub Vec<SessionRecord>);

impl SessionList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SessionRecord> {
        self.0.iter()
    }
}

impl Index<usize> for SessionList {
    type Output = SessionRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a SessionList {
    type Item = &'a SessionRecord;
    type IntoIter = std::slice::Iter<'a, SessionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for SessionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No sessions found.");
        }
        for record in &self.0 {
            writeln!(f, "## {} (revision {})", record.id, record.revision)?;
            writeln!(f)?;
            writeln!(f, "- **Created**: {}", LocalDateTime(&record.created_at))?;
            writeln!(f, "- **Updated**: {}", LocalDateTime(&record.updated_at))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One stored session with its metadata and plan.
pub struct SessionDetails<'a>(pub &'a StoredSession);

impl fmt::Display for SessionDetails<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = &self.0.record;
        writeln!(f, "# Session {}", record.id)?;
        writeln!(f)?;
        writeln!(f, "- Revision: {}", record.revision)?;
        writeln!(f, "- Created: {}", LocalDateTime(&record.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&record.updated_at))?;
        writeln!(f)?;
        write!(f, "{}", NormalizedPlan::new(&self.0.document))
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{InstanceId, PlanDocument, Section};

    fn record(id: &str, revision: u64) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            revision,
            created_at: Timestamp::from_second(1640995200).unwrap(), // 2022-01-01 00:00:00 UTC
            updated_at: Timestamp::from_second(1640995200).unwrap(),
        }
    }

    #[test]
    fn test_session_list_display() {
        let list = SessionList(vec![record("monday", 2), record("tuesday", 1)]);
        let output = list.to_string();
        assert!(output.contains("## monday (revision 2)"));
        assert!(output.contains("## tuesday (revision 1)"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, "tuesday");

        assert_eq!(SessionList(vec![]).to_string(), "No sessions found.\n");
    }

    #[test]
    fn test_session_details_include_plan() {
        let stored = StoredSession {
            record: record("monday", 4),
            document: PlanDocument::with_sections(vec![Section::new(
                "Main",
                vec![InstanceId::from("i7")],
            )]),
        };
        let output = SessionDetails(&stored).to_string();

        assert!(output.starts_with("# Session monday\n"));
        assert!(output.contains("- Revision: 4"));
        assert!(output.contains("## Main\n\n- i7\n"));
    }
}
