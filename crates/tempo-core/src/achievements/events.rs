//! Notification events and sinks.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::models::{GoalId, TargetId};

/// A single satisfy/un-satisfy transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AchievementEvent {
    TargetAchieved(TargetId),
    TargetReverted(TargetId),
    GoalAchieved(GoalId),
    GoalReverted(GoalId),
}

impl fmt::Display for AchievementEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AchievementEvent::TargetAchieved(id) => write!(f, "Target {id} achieved"),
            AchievementEvent::TargetReverted(id) => write!(f, "Target {id} no longer met"),
            AchievementEvent::GoalAchieved(id) => write!(f, "Goal {id} achieved"),
            AchievementEvent::GoalReverted(id) => write!(f, "Goal {id} no longer met"),
        }
    }
}

/// Consumer of achievement transitions (toasts, sounds, logs).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &AchievementEvent);
}

/// Writes every event to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, event: &AchievementEvent) {
        info!("{event}");
    }
}

/// Keeps every event it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<AchievementEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything collected so far.
    pub fn drain(&self) -> Vec<AchievementEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&self, event: &AchievementEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
