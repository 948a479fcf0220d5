//! Network availability monitoring.
//!
//! A `watch` channel carries the current online/offline state; the
//! submission orchestrator subscribes to it to queue offline
//! submissions and resume on reconnect. The platform signal comes in
//! either through a polled [`ConnectivityProbe`] or by pushing state
//! with [`NetworkAvailabilityMonitor::set_online`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Platform connectivity signal.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

pub struct NetworkAvailabilityMonitor {
    sender: Arc<watch::Sender<bool>>,
    poller: Option<JoinHandle<()>>,
}

impl NetworkAvailabilityMonitor {
    /// Monitor without a probe; state changes come in via
    /// [`set_online`](Self::set_online). Starts online.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(true);
        Self {
            sender: Arc::new(sender),
            poller: None,
        }
    }

    /// Monitor that polls `probe` at `interval`, publishing only actual
    /// state changes.
    pub fn start(probe: Arc<dyn ConnectivityProbe>, interval: Duration) -> Self {
        let (sender, _) = watch::channel(true);
        let sender = Arc::new(sender);

        let poll_sender = sender.clone();
        let poller = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let online = probe.is_online().await;
                let changed = poll_sender.send_if_modified(|current| {
                    if *current != online {
                        *current = online;
                        true
                    } else {
                        false
                    }
                });
                if changed {
                    tracing::info!(online, "Connectivity changed");
                }
            }
        });

        Self {
            sender,
            poller: Some(poller),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.subscribe().borrow()
    }

    /// Subscribe to connectivity changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Push a connectivity state directly (platform event path).
    pub fn set_online(&self, online: bool) {
        self.sender.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });
    }

    pub fn stop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl Default for NetworkAvailabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NetworkAvailabilityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
