//! End-to-end procedure scenarios: the state machine, location
//! resolution and submission orchestration working together against
//! fake devices and a scripted backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::watch;

use afval_client::{SubmissionRequest, SubmissionTransport};
use afval_core::{
    AddressCandidate, AppError, ClassifiedLabel, Config, ContactChoice, Coordinate, DraftStatus,
    OptimizedPhoto, PhotoAttachment, Step, StructuredAddress, SubmissionReceipt, WasteType,
};
use afval_geo::{Geocoder, GeolocationDevice, LocationResolutionService};
use afval_infra::BackoffPolicy;
use afval_procedure::{
    MemoryDraftStore, ProcedureStateMachine, SubmissionOrchestrator, SubmissionState,
};
use afval_processing::ClassificationOutcome;

struct FakeGeocoder;

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<AddressCandidate>, AppError> {
        Ok(vec![])
    }

    async fn reverse(&self, _coordinate: Coordinate) -> Result<StructuredAddress, AppError> {
        Ok(StructuredAddress {
            road: "Grote Markt".to_string(),
            house_number: "1".to_string(),
            locality: "Groningen".to_string(),
            municipality: "Groningen".to_string(),
            ..Default::default()
        })
    }
}

struct FixedPosition(Coordinate);

#[async_trait]
impl GeolocationDevice for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, AppError> {
        Ok(self.0)
    }
}

struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<SubmissionReceipt, AppError>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<SubmissionReceipt, AppError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionTransport for ScriptedTransport {
    async fn submit(&self, _request: &SubmissionRequest) -> Result<SubmissionReceipt, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AppError::Internal("script exhausted".to_string())))
    }
}

fn optimized_photo() -> PhotoAttachment {
    let mut photo = PhotoAttachment::new(Bytes::from_static(b"raw-capture"), "image/jpeg");
    photo.optimized = Some(OptimizedPhoto {
        data: Bytes::from_static(b"optimized-jpeg"),
        width: 800,
        height: 600,
    });
    photo
}

fn machine() -> ProcedureStateMachine {
    ProcedureStateMachine::new(Arc::new(MemoryDraftStore::new()), &Config::default())
}

fn resolver(position: Coordinate) -> LocationResolutionService {
    LocationResolutionService::new(
        Arc::new(FakeGeocoder),
        Arc::new(FixedPosition(position)),
        &Config::default(),
    )
}

fn orchestrator(
    transport: Arc<ScriptedTransport>,
    online: watch::Receiver<bool>,
) -> SubmissionOrchestrator {
    let backoff = BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(4), 3);
    SubmissionOrchestrator::new(transport, backoff, online)
}

fn online() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(true);
    rx
}

fn ok(id: &str) -> Result<SubmissionReceipt, AppError> {
    Ok(SubmissionReceipt {
        report_id: id.to_string(),
    })
}

fn http_500() -> Result<SubmissionReceipt, AppError> {
    Err(AppError::from_http_status(500, "internal error"))
}

/// Walk the machine from Start to Review with the device GPS fixed on
/// the Groningen city centre.
async fn walk_to_review(m: &mut ProcedureStateMachine) {
    m.advance().unwrap();
    m.set_photo(optimized_photo());
    m.advance().unwrap();
    m.complete_photo_processing(ClassificationOutcome {
        labels: vec![ClassifiedLabel {
            label: WasteType::new("plastic"),
            confidence: 0.9,
        }],
        fact: None,
    })
    .unwrap();
    assert_eq!(m.current_step(), Step::Location);

    let info = resolver(Coordinate::new(53.2194, 6.5665))
        .resolve_current_position()
        .await
        .unwrap();
    m.set_location(info);
    m.advance().unwrap();

    m.set_contact(ContactChoice::Anonymous);
    m.advance().unwrap();
    assert_eq!(m.current_step(), Step::Review);
}

#[tokio::test]
async fn test_happy_path_gps_to_submitted() {
    let mut m = machine();
    walk_to_review(&mut m).await;
    assert_eq!(m.advance().unwrap(), Step::SubmitResult);

    let transport = ScriptedTransport::new(vec![ok("GR-123")]);
    let orchestrator = orchestrator(transport.clone(), online());

    let mut draft = m.draft().clone();
    let receipt = orchestrator.submit(&mut draft).await.unwrap();
    m.apply_submitted(draft);

    assert_eq!(receipt.report_id, "GR-123");
    assert_eq!(m.draft().status, DraftStatus::Submitted);
    assert!(m.draft().submitted_at.is_some());
    assert_eq!(transport.calls(), 1);

    // Starting over yields a fresh, empty draft
    let old_id = m.draft().id;
    m.reset();
    assert_eq!(m.current_step(), Step::Start);
    assert_eq!(m.furthest_step(), Step::Start);
    assert_ne!(m.draft().id, old_id);
    assert!(m.draft().photo.is_none());
}

#[tokio::test]
async fn test_out_of_area_gps_writes_nothing() {
    let mut m = machine();
    m.advance().unwrap();
    m.set_photo(optimized_photo());
    m.advance().unwrap();
    m.complete_photo_processing(ClassificationOutcome::default())
        .unwrap();

    // Device reports an Amsterdam position
    let err = resolver(Coordinate::new(52.3676, 4.9041))
        .resolve_current_position()
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::OutOfServiceArea { .. }));

    // Nothing was written; the location step stays incomplete
    assert!(m.draft().location.is_none());
    assert!(m.advance().is_err());
    assert_eq!(m.current_step(), Step::Location);
}

#[tokio::test]
async fn test_three_server_errors_exhaust_retries_then_manual_retry() {
    let mut m = machine();
    walk_to_review(&mut m).await;
    m.advance().unwrap();

    let transport = ScriptedTransport::new(vec![http_500(), http_500(), http_500(), ok("GR-124")]);
    let orchestrator = orchestrator(transport.clone(), online());

    let mut draft = m.draft().clone();
    let err = orchestrator.submit(&mut draft).await.unwrap_err();
    assert!(matches!(err, AppError::TransientNetwork(_)));
    assert_eq!(draft.status, DraftStatus::Failed);
    assert_eq!(orchestrator.state(), SubmissionState::Failed);
    assert_eq!(transport.calls(), 3);

    // Manual retry re-enters Submitting and succeeds on the 4th attempt
    let receipt = orchestrator.submit(&mut draft).await.unwrap();
    assert_eq!(receipt.report_id, "GR-124");
    assert_eq!(draft.status, DraftStatus::Submitted);
    assert_eq!(transport.calls(), 4);
}

#[tokio::test]
async fn test_navigation_never_clears_collected_data() {
    let mut m = machine();
    walk_to_review(&mut m).await;

    m.retreat();
    m.retreat();
    assert_eq!(m.current_step(), Step::Location);
    // Going back from Location skips PhotoProcessing
    m.retreat();
    assert_eq!(m.current_step(), Step::Photo);
    m.jump_to(Step::Review).unwrap();

    let draft = m.draft();
    assert!(draft.photo.is_some());
    assert!(draft.location.is_some());
    assert_eq!(draft.contact, ContactChoice::Anonymous);
    assert_eq!(draft.waste_types, vec![WasteType::new("plastic")]);
}

#[tokio::test]
async fn test_missing_location_fails_before_any_network_call() {
    let mut m = machine();
    m.advance().unwrap();
    m.set_photo(optimized_photo());
    m.advance().unwrap();
    m.complete_photo_processing(ClassificationOutcome::default())
        .unwrap();

    let transport = ScriptedTransport::new(vec![ok("GR-125")]);
    let orchestrator = orchestrator(transport.clone(), online());

    let mut draft = m.draft().clone();
    let err = orchestrator.submit(&mut draft).await.unwrap_err();
    assert!(matches!(err, AppError::DraftIncomplete(_)));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_empty_waste_categories_never_reach_the_backend() {
    let mut m = machine();
    m.advance().unwrap();
    m.set_photo(optimized_photo());
    m.advance().unwrap();
    // Classifier found nothing and the reporter selected nothing
    m.complete_photo_processing(ClassificationOutcome::default())
        .unwrap();
    let info = resolver(Coordinate::new(53.2194, 6.5665))
        .resolve_current_position()
        .await
        .unwrap();
    m.set_location(info);
    m.advance().unwrap();
    m.set_contact(ContactChoice::Anonymous);
    m.advance().unwrap();

    // The review gate already blocks the advance
    assert!(m.advance().is_err());
    assert_eq!(m.current_step(), Step::Review);

    // And the orchestrator's own guard blocks a direct submit too
    let transport = ScriptedTransport::new(vec![ok("GR-999")]);
    let orchestrator = orchestrator(transport.clone(), online());
    let mut draft = m.draft().clone();
    let err = orchestrator.submit(&mut draft).await.unwrap_err();
    assert!(matches!(err, AppError::DraftIncomplete(_)));
    assert_eq!(transport.calls(), 0);
    assert_eq!(draft.status, DraftStatus::Draft);
}

#[tokio::test]
async fn test_expired_draft_cannot_be_submitted() {
    let mut m = machine();
    walk_to_review(&mut m).await;
    m.advance().unwrap();

    let expired = m.check_expiry(chrono::Utc::now() + chrono::Duration::minutes(31));
    assert!(expired);

    let transport = ScriptedTransport::new(vec![ok("GR-126")]);
    let orchestrator = orchestrator(transport.clone(), online());

    let mut draft = m.draft().clone();
    let err = orchestrator.submit(&mut draft).await.unwrap_err();
    assert!(matches!(err, AppError::DraftExpired));
    assert_eq!(transport.calls(), 0);
}
