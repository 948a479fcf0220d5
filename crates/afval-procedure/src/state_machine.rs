//! The procedure state machine.
//!
//! Owns the current step, the furthest step reached and the draft.
//! Navigation is gated by the per-step completion predicates; invalid
//! requests are rejected as values and leave both step and draft
//! untouched. Backward navigation and forward re-navigation never
//! discard collected data.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;

use afval_core::{
    AppError, Config, ContactChoice, DraftStatus, LocationInfo, PhotoAttachment, ReportDraft,
    Step, WasteType,
};
use afval_processing::ClassificationOutcome;

use crate::store::DraftStore;
use crate::validation::step_completion;

pub struct ProcedureStateMachine {
    current_step: Step,
    furthest_step: Step,
    draft: ReportDraft,
    offline: bool,
    store: Arc<dyn DraftStore>,
    draft_lifetime: Duration,
    classification_min_confidence: f32,
    step_changes: watch::Sender<Step>,
}

impl ProcedureStateMachine {
    pub fn new(store: Arc<dyn DraftStore>, config: &Config) -> Self {
        let draft = ReportDraft::new();
        store.put(&draft);
        tracing::info!(draft_id = %draft.id, "Procedure started");

        let (step_changes, _) = watch::channel(Step::Start);
        Self {
            current_step: Step::Start,
            furthest_step: Step::Start,
            draft,
            offline: false,
            store,
            draft_lifetime: Duration::minutes(config.draft_lifetime_minutes),
            classification_min_confidence: config.classification_min_confidence,
            step_changes,
        }
    }

    /// Subscribe to step changes. The camera guard uses this to release
    /// the live stream when the procedure leaves the photo step.
    pub fn subscribe_steps(&self) -> watch::Receiver<Step> {
        self.step_changes.subscribe()
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn furthest_step(&self) -> Step {
        self.furthest_step
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Advance to the next step. Rejected with `Validation` when the
    /// current step is incomplete; the rejection is a no-op.
    pub fn advance(&mut self) -> Result<Step, AppError> {
        self.discard_if_expired();
        step_completion(self.current_step, &self.draft)?;

        let Some(next) = self.current_step.next() else {
            return Err(AppError::Validation(
                "already at the final step".to_string(),
            ));
        };
        self.move_to(next);
        Ok(self.current_step)
    }

    /// Settle the photo-processing step with the classifier's outcome
    /// and auto-advance to the location step. Labels below the
    /// confidence threshold are dropped; when nothing passes, the
    /// reporter selects categories manually. A failed classification
    /// settles with an empty outcome.
    pub fn complete_photo_processing(
        &mut self,
        outcome: ClassificationOutcome,
    ) -> Result<Step, AppError> {
        self.discard_if_expired();
        if self.current_step != Step::PhotoProcessing {
            return Err(AppError::Validation(format!(
                "not in photo processing (current: {:?})",
                self.current_step
            )));
        }

        let accepted = outcome.accepted_labels(self.classification_min_confidence);
        tracing::debug!(
            accepted = accepted.len(),
            total = outcome.labels.len(),
            "Photo processing settled"
        );
        for label in accepted {
            self.draft.add_waste_type(label);
        }
        if outcome.fact.is_some() {
            self.draft.fact = outcome.fact;
        }
        self.persist();

        self.move_to(Step::Location);
        Ok(self.current_step)
    }

    /// Go back to the previous interactive step. No-op at the first
    /// step. Never touches draft data.
    pub fn retreat(&mut self) -> Step {
        self.discard_if_expired();
        if let Some(previous) = self.current_step.previous_interactive() {
            self.current_step = previous;
            self.step_changes.send_replace(self.current_step);
        }
        self.current_step
    }

    /// Jump directly to an interactive step no further than the
    /// furthest step reached.
    pub fn jump_to(&mut self, step: Step) -> Result<Step, AppError> {
        self.discard_if_expired();
        if !step.is_interactive() {
            return Err(AppError::Validation(format!(
                "step {:?} is not interactive",
                step
            )));
        }
        if step > self.furthest_step {
            return Err(AppError::Validation(format!(
                "step {:?} has not been reached yet",
                step
            )));
        }
        self.current_step = step;
        self.step_changes.send_replace(self.current_step);
        Ok(self.current_step)
    }

    /// Discard the draft and start over with a fresh one. Clears the
    /// furthest-step tracking.
    pub fn reset(&mut self) {
        self.store.remove(self.draft.id);
        self.draft = ReportDraft::new();
        self.current_step = Step::Start;
        self.furthest_step = Step::Start;
        self.step_changes.send_replace(Step::Start);
        self.persist();
        tracing::info!(draft_id = %self.draft.id, "Procedure reset");
    }

    // Draft mutators: collect data, persist after every change. None of
    // them move the current step.

    pub fn set_photo(&mut self, photo: PhotoAttachment) {
        self.draft.photo = Some(photo);
        self.persist();
    }

    pub fn set_location(&mut self, location: LocationInfo) {
        self.draft.location = Some(location);
        self.persist();
    }

    pub fn set_contact(&mut self, contact: ContactChoice) {
        self.draft.contact = contact;
        self.persist();
    }

    pub fn add_waste_type(&mut self, waste_type: WasteType) {
        self.draft.add_waste_type(waste_type);
        self.persist();
    }

    pub fn remove_waste_type(&mut self, waste_type: &WasteType) {
        self.draft.remove_waste_type(waste_type);
        self.persist();
    }

    /// Apply a submission-side status change (the orchestrator mutates
    /// a copy of the draft; the machine takes the result back).
    pub fn apply_submitted(&mut self, draft: ReportDraft) {
        self.draft = draft;
        self.persist();
    }

    /// Mark the draft expired if its lifetime has elapsed. Submitted
    /// drafts are exempt. Returns whether the draft is now expired.
    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> bool {
        if self.draft.status == DraftStatus::Submitted {
            return false;
        }
        if self.draft.status != DraftStatus::Expired
            && self.draft.is_past_lifetime(now, self.draft_lifetime)
        {
            tracing::info!(draft_id = %self.draft.id, "Draft expired");
            self.draft.status = DraftStatus::Expired;
            self.persist();
        }
        self.draft.status == DraftStatus::Expired
    }

    /// An expired draft is discarded on the next interaction, forcing a
    /// fresh procedure.
    fn discard_if_expired(&mut self) {
        self.check_expiry(Utc::now());
        if self.draft.status == DraftStatus::Expired {
            tracing::info!(draft_id = %self.draft.id, "Discarding expired draft");
            self.reset();
        }
    }

    fn move_to(&mut self, step: Step) {
        self.current_step = step;
        self.furthest_step = self.furthest_step.max(step);
        self.step_changes.send_replace(step);
    }

    fn persist(&self) {
        self.store.put(&self.draft);
    }
}
