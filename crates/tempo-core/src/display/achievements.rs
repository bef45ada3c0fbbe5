//! Achievement transitions and satisfied sets.

use std::fmt;

use crate::achievements::{AchievementEvents, SatisfactionSnapshot};

/// Markdown summary of one recomputation: what changed, and optionally what
/// is satisfied now.
pub struct AchievementSummary<'a> {
    pub events: &'a AchievementEvents,
    pub current: Option<&'a SatisfactionSnapshot>,
}

impl<'a> AchievementSummary<'a> {
    pub fn new(events: &'a AchievementEvents) -> Self {
        Self {
            events,
            current: None,
        }
    }

    pub fn with_current(mut self, current: &'a SatisfactionSnapshot) -> Self {
        self.current = Some(current);
        self
    }
}

impl fmt::Display for AchievementSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.events.is_empty() {
            writeln!(f, "No achievement changes.")?;
        } else {
            writeln!(f, "## Changes")?;
            writeln!(f)?;
            for event in self.events.events() {
                writeln!(f, "- {event}")?;
            }
        }

        if let Some(current) = self.current {
            writeln!(f)?;
            writeln!(f, "## Satisfied")?;
            writeln!(f)?;
            if current.targets.is_empty() && current.goals.is_empty() {
                writeln!(f, "Nothing satisfied yet.")?;
            }
            for id in &current.goals {
                writeln!(f, "- Goal {id}")?;
            }
            for id in &current.targets {
                writeln!(f, "- Target {id}")?;
            }
        }

        Ok(())
    }
}
