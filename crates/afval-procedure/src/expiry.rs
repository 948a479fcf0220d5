//! Draft lifetime timer.
//!
//! One timer per draft, started by whoever created the draft. When the
//! lifetime elapses the timer publishes on a `watch` channel; the owner
//! reacts by marking the draft expired. The state machine additionally
//! checks wall-clock expiry on every interaction, so a missed timer
//! (process suspended, for instance) still expires the draft.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct DraftExpiryTimer {
    expired: watch::Receiver<bool>,
    timer: JoinHandle<()>,
}

impl DraftExpiryTimer {
    /// Start a timer that fires `lifetime` after `created_at`. Fires
    /// immediately when the lifetime has already elapsed.
    pub fn start(created_at: DateTime<Utc>, lifetime: Duration) -> Self {
        let (sender, expired) = watch::channel(false);
        let remaining = (created_at + lifetime - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);

        let timer = tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            let _ = sender.send(true);
        });

        Self { expired, timer }
    }

    pub fn is_expired(&self) -> bool {
        *self.expired.borrow()
    }

    /// Subscribe to the expiry signal.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.expired.clone()
    }

    /// Stop the timer without firing; used when the draft is submitted
    /// or discarded before its lifetime elapses.
    pub fn cancel(&self) {
        self.timer.abort();
    }
}

impl Drop for DraftExpiryTimer {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
