//! Per-step completion predicates.
//!
//! Pure functions over the draft; the state machine calls these to gate
//! forward navigation, and the submission orchestrator reuses the
//! review predicate as its final readiness guard.

use afval_core::{is_valid_email, AppError, ContactChoice, ReportDraft, Step};

/// Whether `step` is complete enough to advance past. The error message
/// names the first missing piece.
pub fn step_completion(step: Step, draft: &ReportDraft) -> Result<(), AppError> {
    match step {
        Step::Start => Ok(()),
        Step::Photo => {
            if draft.has_optimized_photo() {
                Ok(())
            } else {
                Err(AppError::Validation("no optimized photo".to_string()))
            }
        }
        Step::PhotoProcessing => Err(AppError::Validation(
            "photo processing advances automatically".to_string(),
        )),
        Step::Location => {
            if draft.location.is_some() {
                Ok(())
            } else {
                Err(AppError::Validation("no location resolved".to_string()))
            }
        }
        Step::Contact => contact_completion(&draft.contact),
        Step::Review => ready_for_submission(draft),
        Step::SubmitResult => Err(AppError::Validation(
            "already at the final step".to_string(),
        )),
    }
}

fn contact_completion(contact: &ContactChoice) -> Result<(), AppError> {
    match contact {
        ContactChoice::Unspecified => {
            Err(AppError::Validation("no contact choice made".to_string()))
        }
        ContactChoice::Anonymous => Ok(()),
        ContactChoice::Details(details) => {
            if is_valid_email(&details.email) {
                Ok(())
            } else {
                Err(AppError::Validation(format!(
                    "invalid email address: {}",
                    details.email
                )))
            }
        }
    }
}

/// Full readiness check: every piece the submission payload needs.
pub fn ready_for_submission(draft: &ReportDraft) -> Result<(), AppError> {
    if !draft.has_optimized_photo() {
        return Err(AppError::Validation("no optimized photo".to_string()));
    }
    if draft.waste_types.is_empty() {
        return Err(AppError::Validation(
            "no waste category selected".to_string(),
        ));
    }
    if draft.location.is_none() {
        return Err(AppError::Validation("no location resolved".to_string()));
    }
    contact_completion(&draft.contact)
}
