use serde::{Deserialize, Serialize};

/// Category label for a piece of reported litter, e.g. "grofvuil" or
/// "plastic". Produced by the classification collaborator or chosen
/// manually by the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WasteType(pub String);

impl WasteType {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WasteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One label from the classification collaborator with its confidence
/// score (0.0–1.0). The pipeline drops labels below the configured
/// threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedLabel {
    pub label: WasteType,
    pub confidence: f32,
}
