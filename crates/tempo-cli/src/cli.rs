//! Command handlers.
//!
//! Each handler loads its JSON inputs, calls into `tempo_core` and hands the
//! result to the [`TerminalRenderer`] through the core display wrappers, so
//! terminal output and library formatting stay identical.

use anyhow::{bail, Context, Result};
use log::debug;
use serde_json::json;
use tempo_core::{
    display::{AchievementSummary, NormalizedPlan, OperationStatus, SessionDetails, SessionList},
    models::{ActivityInstance, Goal, PlanDocument},
    normalize_with_report, AchievementTracker, AutosaveQueue, DeleteSession, DocumentStore,
    SaveOutcome,
};

use crate::{
    args::{AchievementsArgs, NormalizeArgs, SaveSessionArgs, SessionCommands, ShowSessionArgs},
    input::read_json,
    renderer::TerminalRenderer,
};

pub struct Cli {
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(renderer: TerminalRenderer) -> Self {
        Self { renderer }
    }

    pub fn normalize(&self, args: NormalizeArgs) -> Result<()> {
        let plan: PlanDocument = read_json(&args.plan, "plan")?;
        let instances: Vec<ActivityInstance> = read_json(&args.instances, "instances")?;

        let (normalized, report) = normalize_with_report(&plan, &instances);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&normalized)?);
            return Ok(());
        }

        let view = NormalizedPlan::new(&normalized);
        let view = if args.report {
            view.with_report(&report)
        } else {
            view
        };
        self.renderer.render(&view)
    }

    pub fn achievements(&self, args: AchievementsArgs) -> Result<()> {
        let instances: Vec<ActivityInstance> = read_json(&args.instances, "instances")?;
        let goals: Vec<Goal> = read_json(&args.goals, "goals")?;

        let mut tracker = match &args.previous {
            Some(source) => AchievementTracker::from_state(read_json(source, "previous")?),
            None => AchievementTracker::new(),
        };
        let events = tracker.update(&instances, &goals);
        let current = tracker.snapshot();

        if args.json {
            let output = json!({ "events": events, "satisfied": tracker.state() });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
        self.renderer
            .render(&AchievementSummary::new(&events).with_current(&current))
    }

    pub async fn handle_session_command(
        &self,
        store: &DocumentStore,
        command: SessionCommands,
    ) -> Result<()> {
        match command {
            SessionCommands::Save(args) => self.save_session(store, args).await,
            SessionCommands::Show(args) => self.show_session(store, args).await,
            SessionCommands::List => {
                let sessions = store.list_sessions().await?;
                self.renderer.render(&SessionList(sessions))
            }
            SessionCommands::Delete(args) => {
                let params = DeleteSession::from(args);
                let removed = store
                    .delete_confirmed(&params)
                    .await
                    .context("Failed to delete session")?;
                self.renderer.render(&OperationStatus::success(format!(
                    "Deleted session '{}' (revision {})",
                    removed.id, removed.revision
                )))
            }
        }
    }

    async fn save_session(&self, store: &DocumentStore, args: SaveSessionArgs) -> Result<()> {
        let plan: PlanDocument = read_json(&args.plan, "plan")?;
        let document = match &args.instances {
            Some(source) => {
                let instances: Vec<ActivityInstance> = read_json(source, "instances")?;
                let (normalized, report) = normalize_with_report(&plan, &instances);
                debug!("Normalized before save: {report}");
                normalized
            }
            None => plan,
        };

        let queue = AutosaveQueue::new(store.session(&args.id));
        if let Some(stored) = store.load_session(&args.id).await? {
            queue.seed(&stored.document)?;
        }
        let outcome = queue
            .enqueue(document)
            .await
            .with_context(|| format!("Failed to save session '{}'", args.id))?;

        let record = store
            .load_session(&args.id)
            .await?
            .map(|stored| stored.record)
            .with_context(|| format!("Session '{}' missing after save", args.id))?;

        let message = match outcome {
            SaveOutcome::Saved => format!("Saved session '{}' (revision {})", record.id, record.revision),
            SaveOutcome::Unchanged => format!(
                "Session '{}' unchanged (revision {})",
                record.id, record.revision
            ),
            SaveOutcome::Discarded => bail!("Save of session '{}' was discarded", args.id),
        };
        self.renderer.render(&OperationStatus::success(message))
    }

    async fn show_session(&self, store: &DocumentStore, args: ShowSessionArgs) -> Result<()> {
        let stored = store
            .load_session(&args.id)
            .await?
            .with_context(|| format!("Session '{}' not found", args.id))?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&stored.document)?);
            return Ok(());
        }
        self.renderer.render(&SessionDetails(&stored))
    }
}
