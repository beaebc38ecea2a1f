use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ProgressConfig;

const ENABLE_LOGS: bool = false;

use crate::{log_debug, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressStage {
    Preparing,
    Connecting,
    Uploading,
    Processing,
    ReadingResponse,
    Validating,
    Complete,
    Failed,
}

impl ProgressStage {
    pub fn message(&self) -> &'static str {
        match self {
            ProgressStage::Preparing => "Preparing images...",
            ProgressStage::Connecting => "Connecting to the server...",
            ProgressStage::Uploading => "Uploading images...",
            ProgressStage::Processing => "Reading the labels... this can take 1-2 minutes",
            ProgressStage::ReadingResponse => "Processing the server response...",
            ProgressStage::Validating => "Validating information...",
            ProgressStage::Complete => "Done",
            ProgressStage::Failed => "Processing failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub attempt_id: Uuid,
    pub percent: u8,
    pub stage: ProgressStage,
}

pub type ProgressSender = mpsc::UnboundedSender<ProgressUpdate>;

struct TrackerState {
    percent: u8,
    closed: bool,
}

/// Displayed percentage for one upload attempt.
///
/// Moves forward only, until the attempt settles with `complete` (100) or `fail` (0).
/// After settlement every further update is swallowed.
#[derive(Clone)]
pub struct ProgressTracker {
    attempt_id: Uuid,
    state: Arc<Mutex<TrackerState>>,
    sink: Option<ProgressSender>,
}

impl ProgressTracker {
    pub fn new(attempt_id: Uuid, sink: Option<ProgressSender>) -> Self {
        Self {
            attempt_id,
            state: Arc::new(Mutex::new(TrackerState {
                percent: 0,
                closed: false,
            })),
            sink,
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn percent(&self) -> u8 {
        self.lock().percent
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Move to `percent` if that is ahead of the current value. Returns whether it moved.
    pub fn advance_to(&self, percent: u8, stage: ProgressStage) -> bool {
        let mut state = self.lock();
        if state.closed || percent <= state.percent {
            return false;
        }
        state.percent = percent.min(100);
        self.emit(state.percent, stage);
        true
    }

    /// One estimator step: `increment` further, never past `ceiling`.
    pub fn bump(&self, increment: u8, ceiling: u8) -> Option<u8> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        let next = state.percent.saturating_add(increment).min(ceiling);
        if next <= state.percent {
            return None;
        }
        state.percent = next;
        self.emit(next, ProgressStage::Processing);
        Some(next)
    }

    pub fn complete(&self) {
        self.settle(100, ProgressStage::Complete);
    }

    pub fn fail(&self) {
        self.settle(0, ProgressStage::Failed);
    }

    fn settle(&self, percent: u8, stage: ProgressStage) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.percent = percent;
        state.closed = true;
        self.emit(percent, stage);
    }

    // Called with the state lock held so receivers observe updates in order.
    fn emit(&self, percent: u8, stage: ProgressStage) {
        log_debug!("upload {} progress {}% ({:?})", self.attempt_id, percent, stage);
        if let Some(sink) = &self.sink {
            let update = ProgressUpdate {
                attempt_id: self.attempt_id,
                percent,
                stage,
            };
            if sink.send(update).is_err() {
                log_warn!("progress receiver dropped for upload {}", self.attempt_id);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic synthetic progress, bound to an attempt's cancellation token.
pub struct ProgressEstimator {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressEstimator {
    pub fn spawn(
        tracker: ProgressTracker,
        config: &ProgressConfig,
        token: CancellationToken,
    ) -> Self {
        let period = config.tick();
        let increment = config.increment;
        let ceiling = config.ceiling_percent;
        let loop_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if loop_token.is_cancelled() {
                            break;
                        }
                        tracker.bump(increment, ceiling);
                    }
                }
            }
            log_debug!("progress estimator for {} stopped", tracker.attempt_id());
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Cancel and wait for the tick task to exit. Later calls are no-ops.
    pub async fn stop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                log_warn!("progress estimator task ended abnormally: {err}");
            }
        }
    }
}

impl Drop for ProgressEstimator {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
