//! Draft persistence.
//!
//! The state machine writes the draft back after every mutation so a
//! platform layer can restore an interrupted procedure. The in-memory
//! store is the default; a platform adapter can bridge to session
//! storage.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use afval_core::ReportDraft;

pub trait DraftStore: Send + Sync {
    fn put(&self, draft: &ReportDraft);
    fn get(&self, id: Uuid) -> Option<ReportDraft>;
    fn remove(&self, id: Uuid);
}

#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<HashMap<Uuid, ReportDraft>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, ReportDraft>> {
        self.drafts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DraftStore for MemoryDraftStore {
    fn put(&self, draft: &ReportDraft) {
        self.lock().insert(draft.id, draft.clone());
    }

    fn get(&self, id: Uuid) -> Option<ReportDraft> {
        self.lock().get(&id).cloned()
    }

    fn remove(&self, id: Uuid) {
        self.lock().remove(&id);
    }
}
