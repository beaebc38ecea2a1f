use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    error::CaptureError,
    models::{DisplayRegistry, PhotoRecord, PhotoStep, PhotoStepCatalog},
};

use super::{
    encode::encode_jpeg,
    source::{CameraAccess, ImageSource},
    state::{AcceptedPhoto, CaptureSnapshot, CaptureState},
};

/// Ordered photo acquisition for one product.
///
/// `step_index` always equals the number of accepted photos; a pending capture is
/// tagged with the step it answers and only counts once confirmed. Accepted photos
/// are kept in catalog order so the upload sees front/left/right/back regardless of
/// which one was retaken last.
pub struct CaptureSession {
    catalog: PhotoStepCatalog,
    camera: Arc<dyn CameraAccess>,
    displays: DisplayRegistry,
    jpeg_quality: u8,
    step_index: usize,
    accepted: Vec<PhotoRecord>,
    pending: Option<PhotoRecord>,
    source: Option<Box<dyn ImageSource>>,
}

impl CaptureSession {
    pub fn new(catalog: PhotoStepCatalog, camera: Arc<dyn CameraAccess>, jpeg_quality: u8) -> Self {
        Self::with_registry(catalog, camera, jpeg_quality, DisplayRegistry::new())
    }

    pub fn with_registry(
        catalog: PhotoStepCatalog,
        camera: Arc<dyn CameraAccess>,
        jpeg_quality: u8,
        displays: DisplayRegistry,
    ) -> Self {
        Self {
            catalog,
            camera,
            displays,
            jpeg_quality,
            step_index: 0,
            accepted: Vec::new(),
            pending: None,
            source: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        if let Some(pending) = &self.pending {
            return CaptureState::PendingConfirm {
                step_index: self.step_index,
                step_id: pending.step_id().to_string(),
            };
        }

        if self.accepted.len() >= self.catalog.required_count() {
            return CaptureState::ReadyToProcess {
                accepted: self.accepted.len(),
            };
        }

        if self.source.is_none() && self.accepted.is_empty() {
            return CaptureState::Idle;
        }

        CaptureState::Capturing {
            step_index: self.step_index,
            step_id: self
                .next_step()
                .map(|step| step.id.clone())
                .unwrap_or_default(),
        }
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        let describe = |record: &PhotoRecord| AcceptedPhoto {
            step_id: record.step_id().to_string(),
            display_id: record.display_id(),
        };

        CaptureSnapshot {
            state: self.state(),
            step_index: self.step_index,
            total_steps: self.catalog.len(),
            required_steps: self.catalog.required_count(),
            camera_open: self.is_capability_open(),
            next_step: self.next_step().cloned(),
            pending: self.pending.as_ref().map(describe),
            accepted: self.accepted.iter().map(describe).collect(),
        }
    }

    /// Open the camera. Already-open sessions are left as they are.
    pub async fn start(&mut self) -> Result<CaptureState, CaptureError> {
        if self.source.is_some() {
            return Ok(self.state());
        }

        match self.camera.acquire().await {
            Ok(source) => {
                self.source = Some(source);
                info!("Camera started at step {}", self.step_index);
                Ok(self.state())
            }
            Err(err) => {
                warn!("Camera access denied: {err:#}");
                Err(CaptureError::CapabilityUnavailable(format!("{err:#}")))
            }
        }
    }

    /// Release the camera but keep every photo. Safe to call when nothing is open.
    pub fn stop(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
            info!("Camera stopped");
        }
    }

    pub async fn capture(&mut self) -> Result<CaptureState, CaptureError> {
        if self.pending.is_some() {
            return Err(CaptureError::CaptureAlreadyPending);
        }
        if self.source.is_none() {
            return Err(CaptureError::NoActiveCapability);
        }
        if self.step_index >= self.catalog.len() {
            return Err(CaptureError::AllStepsCaptured);
        }

        let step_id = self
            .next_step()
            .map(|step| step.id.clone())
            .ok_or(CaptureError::AllStepsCaptured)?;

        let frame = self
            .source
            .as_mut()
            .ok_or(CaptureError::NoActiveCapability)?
            .read_frame()
            .map_err(|err| CaptureError::FrameUnavailable(format!("{err:#}")))?;

        let quality = self.jpeg_quality;
        let bytes = tokio::task::spawn_blocking(move || encode_jpeg(&frame, quality))
            .await
            .map_err(|err| CaptureError::Encoding(format!("encoder worker failed: {err}")))?
            .map_err(|err| CaptureError::Encoding(format!("{err:#}")))?;

        debug!("Captured {} ({} bytes)", step_id, bytes.len());
        self.pending = Some(PhotoRecord::new(step_id, bytes, self.displays.issue()));
        Ok(self.state())
    }

    pub fn confirm(&mut self) -> Result<CaptureState, CaptureError> {
        let record = self.pending.take().ok_or(CaptureError::NoPendingCapture)?;

        let rank = self.catalog.position(record.step_id());
        let insert_at = self
            .accepted
            .iter()
            .position(|existing| self.catalog.position(existing.step_id()) > rank)
            .unwrap_or(self.accepted.len());
        self.accepted.insert(insert_at, record);
        self.step_index = self.accepted.len();

        info!(
            "Photo confirmed ({}/{})",
            self.accepted.len(),
            self.catalog.len()
        );

        if self.step_index >= self.catalog.len() {
            self.stop();
        }

        Ok(self.state())
    }

    pub fn retake(&mut self) -> Result<CaptureState, CaptureError> {
        let discarded = self.pending.take().ok_or(CaptureError::NoPendingCapture)?;
        debug!("Discarded capture for {}", discarded.step_id());
        Ok(self.state())
    }

    /// Remove an accepted photo and rewind to the next missing step.
    ///
    /// A capture still waiting for confirmation is discarded too, since the step it
    /// was taken for may no longer be the one being asked for. Emptying the session
    /// reopens the camera at step 0.
    pub async fn delete(&mut self, index: usize) -> Result<CaptureState, CaptureError> {
        if index >= self.accepted.len() {
            return Err(CaptureError::InvalidPhotoIndex {
                index,
                len: self.accepted.len(),
            });
        }

        let removed = self.accepted.remove(index);
        info!("Deleted photo {} ({})", index, removed.step_id());
        drop(removed);

        if let Some(pending) = self.pending.take() {
            debug!("Dropped unconfirmed capture for {}", pending.step_id());
        }

        self.step_index = self.accepted.len();

        if self.accepted.is_empty() {
            self.start().await?;
        }

        Ok(self.state())
    }

    /// Back to `Idle`: camera released, every photo discarded.
    pub fn reset(&mut self) -> CaptureState {
        self.stop();
        self.pending = None;
        self.accepted.clear();
        self.step_index = 0;
        CaptureState::Idle
    }

    /// The step the next capture will be tagged with: the first catalog step without a photo.
    pub fn next_step(&self) -> Option<&PhotoStep> {
        if self.step_index >= self.catalog.len() {
            return None;
        }
        self.catalog
            .steps()
            .iter()
            .find(|step| !self.accepted.iter().any(|photo| photo.step_id() == step.id))
    }

    pub fn accepted(&self) -> &[PhotoRecord] {
        &self.accepted
    }

    pub fn pending(&self) -> Option<&PhotoRecord> {
        self.pending.as_ref()
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn catalog(&self) -> &PhotoStepCatalog {
        &self.catalog
    }

    pub fn displays(&self) -> &DisplayRegistry {
        &self.displays
    }

    pub fn is_capability_open(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), CaptureState::ReadyToProcess { .. })
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}
