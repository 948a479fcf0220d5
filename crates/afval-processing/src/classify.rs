//! Waste classification collaborator contract.
//!
//! The model itself is external; the pipeline only consumes its result:
//! a list of category labels with confidences, possibly empty, in which
//! case the reporter selects categories manually.

use async_trait::async_trait;

use afval_core::{AppError, ClassifiedLabel, WasteType};

/// Result of classifying an optimized photo.
#[derive(Debug, Clone, Default)]
pub struct ClassificationOutcome {
    pub labels: Vec<ClassifiedLabel>,
    /// Optional trivia string for the result screen.
    pub fact: Option<String>,
}

impl ClassificationOutcome {
    /// Labels at or above the confidence threshold, in ranking order.
    pub fn accepted_labels(&self, min_confidence: f32) -> Vec<WasteType> {
        self.labels
            .iter()
            .filter(|l| l.confidence >= min_confidence)
            .map(|l| l.label.clone())
            .collect()
    }
}

/// Classification collaborator: image binary in, category labels out.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> Result<ClassificationOutcome, AppError>;
}
