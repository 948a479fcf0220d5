//! Waste classification client.
//!
//! Posts the optimized photo to the classification endpoint and maps
//! the response onto [`ClassificationOutcome`]. An empty label list is
//! a valid result; the reporter then selects categories manually.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use afval_core::{AppError, ClassifiedLabel, WasteType};
use afval_processing::{ClassificationOutcome, Classifier};

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    #[serde(default)]
    labels: Vec<LabelEntry>,
    #[serde(default)]
    fact: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelEntry {
    label: String,
    confidence: f32,
}

/// Classifier backed by the reporting backend's classification API.
pub struct ClassificationClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ClassificationClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for classification")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Classifier for ClassificationClient {
    async fn classify(&self, image: &[u8]) -> Result<ClassificationOutcome, AppError> {
        let url = format!("{}/classificatie", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "image/jpeg")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| AppError::TransientNetwork(format!("classification request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::from_http_status(status.as_u16(), message));
        }

        let body: ClassificationResponse = response
            .json()
            .await
            .map_err(|e| AppError::TransientNetwork(format!("classification response: {}", e)))?;

        tracing::debug!(labels = body.labels.len(), "Classification result");
        Ok(ClassificationOutcome {
            labels: body
                .labels
                .into_iter()
                .map(|entry| ClassifiedLabel {
                    label: WasteType::new(entry.label),
                    confidence: entry.confidence,
                })
                .collect(),
            fact: body.fact,
        })
    }
}
