use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LocationInfo, WasteType};

/// Lifecycle status of a report draft.
///
/// Transitions happen only through the submission orchestrator or the
/// expiry timer; no other component writes this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Draft,
    Submitting,
    Submitted,
    Failed,
    Expired,
    Cancelled,
}

/// Raw capture plus its optimized derivative. The optimized image only
/// exists alongside the raw capture it was derived from; constructing
/// the attachment from a raw image enforces that.
#[derive(Debug, Clone)]
pub struct PhotoAttachment {
    pub raw: Bytes,
    pub content_type: String,
    pub optimized: Option<OptimizedPhoto>,
}

impl PhotoAttachment {
    pub fn new(raw: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            raw,
            content_type: content_type.into(),
            optimized: None,
        }
    }
}

/// Downscaled, re-encoded JPEG derivative of the raw capture.
#[derive(Debug, Clone)]
pub struct OptimizedPhoto {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

impl OptimizedPhoto {
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Contact preference for a report. Reporters either stay anonymous or
/// leave a name and a validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactChoice {
    /// No choice made yet; the contact step is not complete.
    Unspecified,
    Anonymous,
    Details(ContactDetails),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

/// Acknowledgement from the submission backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub report_id: String,
}

/// The mutable working record for one in-progress litter report.
///
/// Exclusively owned and mutated by the procedure state machine;
/// pipelines receive requests and return results but never hold a
/// reference to the draft.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub id: Uuid,
    pub photo: Option<PhotoAttachment>,
    pub waste_types: Vec<WasteType>,
    /// Trivia string returned by the classifier, shown on the result
    /// screen.
    pub fact: Option<String>,
    pub location: Option<LocationInfo>,
    pub contact: ContactChoice,
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReportDraft {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            photo: None,
            waste_types: Vec::new(),
            fact: None,
            location: None,
            contact: ContactChoice::Unspecified,
            status: DraftStatus::Draft,
            created_at: Utc::now(),
            submitted_at: None,
        }
    }

    /// Ordered, de-duplicated insert of a waste category.
    pub fn add_waste_type(&mut self, waste_type: WasteType) {
        if !self.waste_types.contains(&waste_type) {
            self.waste_types.push(waste_type);
        }
    }

    pub fn remove_waste_type(&mut self, waste_type: &WasteType) {
        self.waste_types.retain(|w| w != waste_type);
    }

    pub fn has_optimized_photo(&self) -> bool {
        self.photo
            .as_ref()
            .is_some_and(|p| p.optimized.is_some())
    }

    /// Whether the draft's lifetime has elapsed relative to `now`.
    pub fn is_past_lifetime(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        now - self.created_at >= lifetime
    }

    /// A draft can only be submitted while it is in `Draft` or `Failed`
    /// status (the latter for manual retry).
    pub fn is_submittable_status(&self) -> bool {
        matches!(self.status, DraftStatus::Draft | DraftStatus::Failed)
    }
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self::new()
    }
}
