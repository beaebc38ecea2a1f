use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::{self, Duration};
use uuid::Uuid;

use crate::{
    api::{HttpReply, ImagePart, InventoryApi},
    config::ProgressConfig,
    error::UploadError,
    models::{ExtractionResult, PhotoRecord},
    utils::InFlight,
};

use super::{
    attempt::{AbortHandle, Settlement, UploadAttempt},
    progress::{ProgressSender, ProgressStage, ProgressTracker},
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const PREPARING_PERCENT: u8 = 5;
const CONNECTING_PERCENT: u8 = 10;
const READING_PERCENT: u8 = 92;
const VALIDATING_PERCENT: u8 = 95;

type AbortSlot = Arc<Mutex<Option<AbortHandle>>>;

/// Submits accepted photos to the extraction endpoint, one attempt at a time.
pub struct UploadPipeline {
    api: Arc<dyn InventoryApi>,
    progress: ProgressConfig,
    sink: Option<ProgressSender>,
    in_flight: InFlight,
    current: AbortSlot,
}

impl UploadPipeline {
    pub fn new(api: Arc<dyn InventoryApi>, progress: ProgressConfig) -> Self {
        Self {
            api,
            progress,
            sink: None,
            in_flight: InFlight::new(),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_progress_sink(mut self, sink: ProgressSender) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// A handle that aborts whichever attempt is in flight when it is used.
    pub fn abort_handle(&self) -> PipelineAbort {
        PipelineAbort {
            current: Arc::clone(&self.current),
        }
    }

    /// Abort the in-flight attempt, if any. Returns whether an attempt was aborted.
    pub fn abort(&self) -> bool {
        self.abort_handle().abort()
    }

    pub async fn submit(
        &self,
        photos: &[PhotoRecord],
        deadline: Duration,
    ) -> Result<ExtractionResult, UploadError> {
        if photos.is_empty() {
            return Err(UploadError::EmptyCapture);
        }
        let _busy = self.in_flight.try_enter().ok_or(UploadError::InFlight)?;

        let attempt_id = Uuid::new_v4();
        let tracker = ProgressTracker::new(attempt_id, self.sink.clone());
        let mut attempt = UploadAttempt::begin(attempt_id, deadline);
        let _registration = Registration::new(&self.current, attempt.abort_handle());

        log_info!("upload {} submitting {} photos", attempt_id, photos.len());

        let outcome = self
            .run(&mut attempt, &tracker, build_parts(photos), deadline)
            .await;

        match &outcome {
            Ok(_) => {
                tracker.complete();
                log_info!("upload {} finished", attempt_id);
            }
            Err(err) => {
                tracker.fail();
                log_warn!("upload {} failed: {}", attempt_id, err);
            }
        }

        outcome
    }

    async fn run(
        &self,
        attempt: &mut UploadAttempt,
        tracker: &ProgressTracker,
        parts: Vec<ImagePart>,
        deadline: Duration,
    ) -> Result<ExtractionResult, UploadError> {
        attempt.start_estimator(tracker.clone(), &self.progress);

        let stage_delay = self.progress.stage_delay();
        let ceiling = self.progress.ceiling_percent;
        let start_percent = self.progress.start_percent.min(ceiling);
        let api = Arc::clone(&self.api);
        let exchange = async move {
            tracker.advance_to(PREPARING_PERCENT.min(ceiling), ProgressStage::Preparing);
            time::sleep(stage_delay).await;
            tracker.advance_to(CONNECTING_PERCENT.min(ceiling), ProgressStage::Connecting);
            time::sleep(stage_delay).await;
            tracker.advance_to(start_percent, ProgressStage::Uploading);
            api.extract(parts).await
        };

        let reply = {
            let cancelled = attempt.cancelled();
            tokio::select! {
                biased;
                _ = cancelled => None,
                reply = exchange => Some(reply),
            }
        };

        let candidate = if reply.is_some() {
            Settlement::Completed
        } else {
            Settlement::Aborted
        };
        let settlement = attempt.settle(candidate);
        attempt.teardown().await;

        match (settlement, reply) {
            (Settlement::DeadlineElapsed, _) => Err(UploadError::Timeout {
                deadline_ms: deadline.as_millis() as u64,
            }),
            (Settlement::Aborted, _) | (Settlement::Completed, None) => Err(UploadError::Aborted),
            (Settlement::Completed, Some(Err(err))) => Err(UploadError::NetworkFailure {
                message: err.message,
            }),
            (Settlement::Completed, Some(Ok(reply))) => read_extraction(reply, tracker),
        }
    }
}

/// Cloneable abort for whichever attempt the pipeline is currently running.
#[derive(Clone)]
pub struct PipelineAbort {
    current: AbortSlot,
}

impl PipelineAbort {
    pub fn abort(&self) -> bool {
        let handle = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        handle.is_some_and(|handle| handle.abort())
    }
}

/// Publishes the running attempt's abort handle and clears it on every exit path.
struct Registration<'a> {
    slot: &'a AbortSlot,
}

impl<'a> Registration<'a> {
    fn new(slot: &'a AbortSlot, handle: AbortHandle) -> Self {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Self { slot }
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Multipart parts in accepted order: `photo_<i>`, filename `<stepId>.jpg`.
pub fn build_parts(photos: &[PhotoRecord]) -> Vec<ImagePart> {
    photos
        .iter()
        .enumerate()
        .map(|(index, photo)| ImagePart {
            field_name: format!("photo_{index}"),
            file_name: photo.upload_filename(),
            bytes: photo.shared_bytes(),
        })
        .collect()
}

fn read_extraction(
    reply: HttpReply,
    tracker: &ProgressTracker,
) -> Result<ExtractionResult, UploadError> {
    if !reply.is_success() {
        return Err(UploadError::ServerError {
            status: reply.status,
            body: reply.text(),
        });
    }

    tracker.advance_to(READING_PERCENT, ProgressStage::ReadingResponse);
    let result: ExtractionResult =
        serde_json::from_slice(&reply.body).map_err(|err| UploadError::InvalidResponse {
            message: err.to_string(),
        })?;
    tracker.advance_to(VALIDATING_PERCENT, ProgressStage::Validating);
    Ok(result)
}
