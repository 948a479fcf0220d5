//! Camera lifecycle tied to procedure navigation.
//!
//! The state machine publishes step changes on a `watch` channel; this
//! guard watches it and releases the live camera stream whenever the
//! procedure is not on the photo step. Release is idempotent, so firing
//! on every non-photo step is safe.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use afval_core::Step;
use afval_processing::PhotoCapturePipeline;

pub struct CameraGuard {
    watcher: JoinHandle<()>,
}

impl CameraGuard {
    /// Spawn a watcher that releases the pipeline's camera stream when
    /// the procedure leaves the photo step (retreat, jump or advance).
    pub fn spawn(
        mut steps: watch::Receiver<Step>,
        pipeline: Arc<Mutex<PhotoCapturePipeline>>,
    ) -> Self {
        let watcher = tokio::spawn(async move {
            while steps.changed().await.is_ok() {
                let step = *steps.borrow_and_update();
                if step != Step::Photo {
                    let mut pipeline = pipeline.lock().await;
                    if pipeline.has_active_stream() {
                        tracing::debug!(?step, "Left photo step, releasing camera");
                        pipeline.cancel().await;
                    }
                }
            }
        });

        Self { watcher }
    }

    pub fn stop(&self) {
        self.watcher.abort();
    }
}

impl Drop for CameraGuard {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::ProcedureStateMachine;
    use crate::store::MemoryDraftStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use afval_core::{AppError, Config};
    use afval_processing::{CameraDevice, CameraStream, RawPhoto};

    struct FakeStream {
        releases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CameraStream for FakeStream {
        async fn capture_frame(&mut self) -> Result<RawPhoto, AppError> {
            Ok(RawPhoto::new(Bytes::from_static(b"frame"), "image/jpeg"))
        }

        async fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeCamera {
        releases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn acquire(&self) -> Result<Box<dyn CameraStream>, AppError> {
            Ok(Box::new(FakeStream {
                releases: self.releases.clone(),
            }))
        }
    }

    async fn wait_for_release(releases: &AtomicUsize) {
        for _ in 0..100 {
            if releases.load(Ordering::SeqCst) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_retreat_from_photo_releases_stream() {
        let releases = Arc::new(AtomicUsize::new(0));
        let camera = Arc::new(FakeCamera {
            releases: releases.clone(),
        });
        let config = Config::default();
        let pipeline = Arc::new(Mutex::new(PhotoCapturePipeline::new(camera, &config)));

        let mut machine =
            ProcedureStateMachine::new(Arc::new(MemoryDraftStore::new()), &config);
        let _guard = CameraGuard::spawn(machine.subscribe_steps(), pipeline.clone());

        machine.advance().unwrap();
        pipeline.lock().await.start_capture().await.unwrap();
        assert!(pipeline.lock().await.has_active_stream());

        machine.retreat();
        wait_for_release(&releases).await;
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(!pipeline.lock().await.has_active_stream());
    }

    #[tokio::test]
    async fn test_reset_releases_stream() {
        let releases = Arc::new(AtomicUsize::new(0));
        let camera = Arc::new(FakeCamera {
            releases: releases.clone(),
        });
        let config = Config::default();
        let pipeline = Arc::new(Mutex::new(PhotoCapturePipeline::new(camera, &config)));

        let mut machine =
            ProcedureStateMachine::new(Arc::new(MemoryDraftStore::new()), &config);
        let _guard = CameraGuard::spawn(machine.subscribe_steps(), pipeline.clone());

        machine.advance().unwrap();
        pipeline.lock().await.start_capture().await.unwrap();

        machine.reset();
        wait_for_release(&releases).await;
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
