//! Submission orchestration.
//!
//! Owns the retry loop and every draft status transition around
//! submission. Retries are an explicit loop over the backoff policy;
//! only retryable errors re-enter it. When the network monitor reports
//! offline, the attempt queues until reconnect instead of burning
//! retries.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::watch;

use afval_client::{SubmissionRequest, SubmissionTransport};
use afval_core::{AppError, DraftStatus, ReportDraft, SubmissionReceipt};
use afval_infra::{compute_backoff, BackoffPolicy};

use crate::validation::ready_for_submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    QueuedOffline,
    Submitted,
    Failed,
}

pub struct SubmissionOrchestrator {
    transport: Arc<dyn SubmissionTransport>,
    backoff: BackoffPolicy,
    online: watch::Receiver<bool>,
    state: Mutex<SubmissionState>,
    cancel: watch::Sender<bool>,
}

impl SubmissionOrchestrator {
    pub fn new(
        transport: Arc<dyn SubmissionTransport>,
        backoff: BackoffPolicy,
        online: watch::Receiver<bool>,
    ) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            transport,
            backoff,
            online,
            state: Mutex::new(SubmissionState::Idle),
            cancel,
        }
    }

    pub fn state(&self) -> SubmissionState {
        *self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: SubmissionState) {
        *self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Abort the in-flight submission, if any. The aborted call
    /// restores the draft to `Draft` status and returns `Cancelled`.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Submit the draft. The readiness guard mirrors the review step's
    /// validation and runs before any network activity; an incomplete
    /// draft never produces a request. On success the draft is stamped
    /// `Submitted` with the backend's report id; a terminal error or
    /// exhausted retries stamp `Failed`, from which a manual retry may
    /// call `submit` again.
    pub async fn submit(
        &self,
        draft: &mut ReportDraft,
    ) -> Result<SubmissionReceipt, AppError> {
        if draft.status == DraftStatus::Expired {
            return Err(AppError::DraftExpired);
        }
        if !draft.is_submittable_status() {
            return Err(AppError::Validation(format!(
                "draft is not submittable in status {:?}",
                draft.status
            )));
        }
        ready_for_submission(draft).map_err(|e| match e {
            AppError::Validation(reason) => AppError::DraftIncomplete(reason),
            other => other,
        })?;
        let request = SubmissionRequest::from_draft(draft)?;

        let _ = self.cancel.send(false);
        let mut cancel_rx = self.cancel.subscribe();
        let mut online_rx = self.online.clone();

        draft.status = DraftStatus::Submitting;
        self.set_state(SubmissionState::Submitting);
        tracing::info!(draft_id = %draft.id, "Submitting report");

        let mut attempt: u32 = 0;
        loop {
            if !*online_rx.borrow() {
                self.set_state(SubmissionState::QueuedOffline);
                tracing::info!(draft_id = %draft.id, "Offline, queueing submission");
                tokio::select! {
                    changed = online_rx.wait_for(|online| *online) => {
                        if changed.is_err() {
                            // Monitor gone; treat as online and attempt
                        }
                        self.set_state(SubmissionState::Submitting);
                    }
                    _ = cancel_rx.changed() => {
                        return self.cancelled(draft);
                    }
                }
            }

            let result = tokio::select! {
                result = self.transport.submit(&request) => result,
                _ = cancel_rx.changed() => {
                    return self.cancelled(draft);
                }
            };

            match result {
                Ok(receipt) => {
                    draft.status = DraftStatus::Submitted;
                    draft.submitted_at = Some(Utc::now());
                    self.set_state(SubmissionState::Submitted);
                    tracing::info!(
                        draft_id = %draft.id,
                        report_id = %receipt.report_id,
                        "Report submitted"
                    );
                    return Ok(receipt);
                }
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.backoff.max_attempts {
                        tracing::warn!(
                            draft_id = %draft.id,
                            attempts = attempt,
                            error = %e,
                            "Submission retries exhausted"
                        );
                        return self.failed(draft, e);
                    }
                    let delay =
                        compute_backoff(self.backoff.base, attempt - 1, self.backoff.max_delay);
                    tracing::debug!(
                        draft_id = %draft.id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Submission attempt failed, backing off"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel_rx.changed() => {
                            return self.cancelled(draft);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(draft_id = %draft.id, error = %e, "Submission rejected");
                    return self.failed(draft, e);
                }
            }
        }
    }

    fn cancelled(&self, draft: &mut ReportDraft) -> Result<SubmissionReceipt, AppError> {
        draft.status = DraftStatus::Draft;
        self.set_state(SubmissionState::Idle);
        tracing::info!(draft_id = %draft.id, "Submission cancelled");
        Err(AppError::Cancelled)
    }

    fn failed(
        &self,
        draft: &mut ReportDraft,
        error: AppError,
    ) -> Result<SubmissionReceipt, AppError> {
        draft.status = DraftStatus::Failed;
        self.set_state(SubmissionState::Failed);
        Err(error)
    }
}
