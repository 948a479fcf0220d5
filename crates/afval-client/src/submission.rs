//! Multipart report submission client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use afval_core::{AppError, ContactChoice, ReportDraft, SubmissionReceipt};

/// Transport seam for report submission. The orchestrator owns retry
/// and backoff; a transport performs exactly one attempt per call.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, AppError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

/// Everything one submission attempt needs, lifted off the draft so
/// the transport never touches draft state.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub photo_jpeg: Bytes,
    pub location: LocationPayload,
    pub waste_types: Vec<String>,
    /// `None` for anonymous reports; the part is omitted entirely.
    pub contact: Option<ContactPayload>,
}

impl SubmissionRequest {
    /// Build the wire request from a draft. Fails with
    /// [`AppError::DraftIncomplete`] when a required part is missing;
    /// no network activity happens on that path.
    pub fn from_draft(draft: &ReportDraft) -> Result<Self, AppError> {
        let optimized = draft
            .photo
            .as_ref()
            .and_then(|p| p.optimized.as_ref())
            .ok_or_else(|| AppError::DraftIncomplete("optimized photo missing".to_string()))?;
        let location = draft
            .location
            .as_ref()
            .ok_or_else(|| AppError::DraftIncomplete("location missing".to_string()))?;

        let contact = match &draft.contact {
            ContactChoice::Unspecified => {
                return Err(AppError::DraftIncomplete(
                    "contact choice missing".to_string(),
                ))
            }
            ContactChoice::Anonymous => None,
            ContactChoice::Details(details) => Some(ContactPayload {
                name: details.name.clone(),
                email: details.email.clone(),
            }),
        };

        Ok(Self {
            photo_jpeg: optimized.data.clone(),
            location: LocationPayload {
                latitude: location.latitude,
                longitude: location.longitude,
                address: location.address.clone(),
            },
            waste_types: draft.waste_types.iter().map(|w| w.to_string()).collect(),
            contact,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Submission transport backed by the reporting backend's HTTP API.
pub struct HttpSubmissionClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSubmissionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for submission")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn build_form(request: &SubmissionRequest) -> Result<reqwest::multipart::Form, AppError> {
        let photo = reqwest::multipart::Part::bytes(request.photo_jpeg.to_vec())
            .file_name("melding.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| AppError::Internal(format!("photo part: {}", e)))?;

        let mut form = reqwest::multipart::Form::new()
            .part("photo", photo)
            .text("location", serde_json::to_string(&request.location)?)
            .text("wasteTypes", serde_json::to_string(&request.waste_types)?);
        if let Some(contact) = &request.contact {
            form = form.text("contact", serde_json::to_string(contact)?);
        }
        Ok(form)
    }
}

#[async_trait]
impl SubmissionTransport for HttpSubmissionClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, AppError> {
        let url = format!("{}/meldingen", self.base_url);
        let form = Self::build_form(request)?;

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::TransientNetwork(format!("submission request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::from_http_status(status.as_u16(), message));
        }

        let body: SubmissionResponse = response
            .json()
            .await
            .map_err(|e| AppError::TransientNetwork(format!("submission response: {}", e)))?;

        match (body.success, body.id) {
            (true, Some(id)) => {
                tracing::info!(report_id = %id, "Report accepted");
                Ok(SubmissionReceipt { report_id: id })
            }
            _ => Err(AppError::TerminalServer {
                status: status.as_u16(),
                message: body
                    .error
                    .unwrap_or_else(|| "submission rejected".to_string()),
            }),
        }
    }
}
