//! Procedure orchestration for the litter reporting flow.
//!
//! The state machine owns the draft and gates step navigation; the
//! submission orchestrator owns status transitions around submission;
//! the network monitor and expiry timer feed both with signals.

pub mod camera;
pub mod expiry;
pub mod network;
pub mod state_machine;
pub mod store;
pub mod submission;
pub mod validation;

pub use camera::CameraGuard;
pub use expiry::DraftExpiryTimer;
pub use network::{ConnectivityProbe, NetworkAvailabilityMonitor};
pub use state_machine::ProcedureStateMachine;
pub use store::{DraftStore, MemoryDraftStore};
pub use submission::{SubmissionOrchestrator, SubmissionState};
pub use validation::{ready_for_submission, step_completion};
