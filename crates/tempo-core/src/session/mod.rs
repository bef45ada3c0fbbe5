//! Explicit editing context for one session plan.
//!
//! A [`SessionEditor`] ties the pieces together for a single open document:
//! instance changes are reconciled into the plan, every resulting document
//! goes through one [`AutosaveQueue`], and goal progress is diffed by one
//! [`AchievementTracker`] whose events reach a [`NotificationSink`].
//!
//! # Examples
//!
//! ```rust
//! use tempo_core::{
//!     models::{ActivityInstance, InstanceId, PlanDocument, Section},
//!     session::SessionEditor,
//! };
//!
//! # async fn example() -> tempo_core::Result<()> {
//! let mut editor = SessionEditor::builder(|_doc: PlanDocument| async {
//!     Ok::<(), tempo_core::TempoError>(())
//! })
//! .build();
//!
//! let plan = PlanDocument::with_sections(vec![Section::new("Main", vec![])]);
//! let instances = vec![ActivityInstance::new("i1", "squat")];
//! editor.load(plan, instances)?.await?;
//!
//! assert_eq!(editor.document().assigned_ids().count(), 1);
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use log::debug;

use crate::{
    achievements::{AchievementEvents, AchievementTracker, LogSink, NotificationSink},
    autosave::{AutosaveQueue, Debouncer, SaveBackend, SaveTicket},
    error::{Result, TempoError},
    models::{ActivityInstance, Goal, PlanDocument},
    reconcile::{normalize_with_report, ReconcileReport},
};


type ErrorHandler = Arc<dyn Fn(&TempoError) + Send + Sync>;

/// Builder for [`SessionEditor`].
pub struct SessionEditorBuilder<B> {
    backend: B,
    on_error: Option<ErrorHandler>,
    sink: Arc<dyn NotificationSink>,
    debounce: Option<Duration>,
}

impl<B> SessionEditorBuilder<B>
where
    B: SaveBackend<PlanDocument>,
{
    /// Called once for every save the backend rejects.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&TempoError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Where achievement events are delivered. Defaults to [`LogSink`].
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Enables [`SessionEditor::edit_debounced`] with the given quiet period.
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = Some(delay);
        self
    }

    pub fn build(self) -> SessionEditor<B> {
        let (queue, debouncer) = open_queue(self.backend, self.on_error.as_ref(), self.debounce);

        SessionEditor {
            queue,
            debouncer,
            on_error: self.on_error,
            debounce: self.debounce,
            tracker: AchievementTracker::new(),
            sink: self.sink,
            document: PlanDocument::default(),
            instances: Vec::new(),
            goals: Vec::new(),
            last_report: ReconcileReport::default(),
        }
    }
}

type QueueParts<B> = (
    AutosaveQueue<PlanDocument, B>,
    Option<Debouncer<PlanDocument, B>>,
);

fn open_queue<B>(
    backend: B,
    on_error: Option<&ErrorHandler>,
    debounce: Option<Duration>,
) -> QueueParts<B>
where
    B: SaveBackend<PlanDocument>,
{
    let queue = match on_error {
        Some(handler) => {
            let handler = Arc::clone(handler);
            AutosaveQueue::with_error_handler(backend, move |err| handler(err))
        }
        None => AutosaveQueue::new(backend),
    };
    let debouncer = debounce.map(|delay| Debouncer::new(queue.clone(), delay));
    (queue, debouncer)
}

/// Controller for the currently open session plan.
pub struct SessionEditor<B> {
    queue: AutosaveQueue<PlanDocument, B>,
    debouncer: Option<Debouncer<PlanDocument, B>>,
    on_error: Option<ErrorHandler>,
    debounce: Option<Duration>,
    tracker: AchievementTracker,
    sink: Arc<dyn NotificationSink>,
    document: PlanDocument,
    instances: Vec<ActivityInstance>,
    goals: Vec<Goal>,
    last_report: ReconcileReport,
}

impl<B> SessionEditor<B>
where
    B: SaveBackend<PlanDocument>,
{
    pub fn builder(backend: B) -> SessionEditorBuilder<B> {
        SessionEditorBuilder {
            backend,
            on_error: None,
            sink: Arc::new(LogSink),
            debounce: None,
        }
    }

    /// Opens `document` as it is stored in the backend.
    ///
    /// The raw document is seeded as persisted, then normalized against
    /// `instances`. The normalized document is enqueued, so it is only saved
    /// when reconciliation actually changed something.
    pub fn load(
        &mut self,
        document: PlanDocument,
        instances: Vec<ActivityInstance>,
    ) -> Result<SaveTicket> {
        self.queue.seed(&document)?;
        self.instances = instances;
        self.document = document;
        Ok(self.renormalize())
    }

    /// Applies a local mutation and saves the result.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn edit<F>(&mut self, f: F) -> SaveTicket
    where
        F: FnOnce(&mut PlanDocument),
    {
        f(&mut self.document);
        self.enqueue_current()
    }

    /// Applies a local mutation and saves it once edits stop arriving.
    ///
    /// Without a configured debounce delay this saves immediately and the
    /// outcome is only reported through the error handler.
    pub fn edit_debounced<F>(&mut self, f: F)
    where
        F: FnOnce(&mut PlanDocument),
    {
        f(&mut self.document);
        match &self.debouncer {
            Some(debouncer) => debouncer.schedule(self.document.clone()),
            None => drop(self.queue.enqueue(self.document.clone())),
        }
    }

    /// Replaces the authoritative instance list, re-normalizes the plan and
    /// saves it. Achievements are recomputed against the current goals.
    pub fn set_instances(&mut self, instances: Vec<ActivityInstance>) -> SaveTicket {
        self.instances = instances;
        let ticket = self.renormalize();
        self.recompute();
        ticket
    }

    /// Replaces the goal list and returns the resulting transitions. Every
    /// event is also forwarded to the sink.
    pub fn refresh_achievements(&mut self, goals: Vec<Goal>) -> AchievementEvents {
        self.goals = goals;
        self.recompute()
    }

    /// Releases a debounced edit and dispatches anything retained after a
    /// failed save.
    pub fn flush(&self) -> SaveTicket {
        if let Some(debouncer) = &self.debouncer {
            if let Some(ticket) = debouncer.flush_now() {
                return ticket;
            }
        }
        self.queue.flush()
    }

    /// Closes the current document and opens another one stored through
    /// `backend`.
    ///
    /// Outstanding saves of the previous document are discarded and the
    /// achievement history starts over. A save of the previous document that
    /// is already in flight still completes against the previous backend,
    /// never against `backend`.
    pub fn switch_document(
        &mut self,
        backend: B,
        document: PlanDocument,
        instances: Vec<ActivityInstance>,
    ) -> Result<SaveTicket> {
        if let Some(debouncer) = &self.debouncer {
            debouncer.cancel();
        }
        self.queue.reset();
        self.tracker.reset();
        debug!("Switching session document");

        let (queue, debouncer) = open_queue(backend, self.on_error.as_ref(), self.debounce);
        self.queue = queue;
        self.debouncer = debouncer;
        self.load(document, instances)
    }

    pub fn document(&self) -> &PlanDocument {
        &self.document
    }

    pub fn instances(&self) -> &[ActivityInstance] {
        &self.instances
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// What the most recent normalization repaired.
    pub fn last_report(&self) -> &ReconcileReport {
        &self.last_report
    }

    pub fn tracker(&self) -> &AchievementTracker {
        &self.tracker
    }

    pub fn queue(&self) -> &AutosaveQueue<PlanDocument, B> {
        &self.queue
    }

    fn renormalize(&mut self) -> SaveTicket {
        let (normalized, report) = normalize_with_report(&self.document, &self.instances);
        if !report.is_clean() {
            debug!("Plan repaired: {report}");
        }
        self.document = normalized;
        self.last_report = report;
        self.enqueue_current()
    }

    fn enqueue_current(&self) -> SaveTicket {
        // A direct save already carries the latest document.
        if let Some(debouncer) = &self.debouncer {
            debouncer.cancel();
        }
        self.queue.enqueue(self.document.clone())
    }

    fn recompute(&mut self) -> AchievementEvents {
        let events = self.tracker.update(&self.instances, &self.goals);
        for event in events.events() {
            self.sink.notify(&event);
        }
        events
    }
}
