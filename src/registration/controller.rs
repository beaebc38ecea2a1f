use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use crate::{
    api::{HttpInventoryApi, InventoryApi},
    capture::{CameraAccess, CaptureSession},
    config::ClientConfig,
    error::{RegistrationError, SaveError, UploadError},
    interpret::{interpret, Interpretation},
    models::{DisplayRegistry, PhotoStepCatalog, ProductDraft, SavedProduct, StoredProduct},
    persistence::PersistenceClient,
    upload::{PipelineAbort, ProgressSender, UploadPipeline},
};

use super::commands::{Command, Outcome};

/// Where the registration flow currently is.
#[derive(Debug, Clone)]
pub enum Phase {
    Capturing,
    UploadFailed { error: UploadError },
    /// `draft` carries the operator's edits; it survives failed saves.
    Review {
        interpretation: Interpretation,
        draft: ProductDraft,
    },
    Saved { product: SavedProduct },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Capturing => "capturing",
            Phase::UploadFailed { .. } => "uploadFailed",
            Phase::Review { .. } => "reviewing",
            Phase::Saved { .. } => "saved",
        }
    }
}

/// One operator's registration flow, from the first photo to the stored product.
pub struct RegistrationController {
    config: ClientConfig,
    session: CaptureSession,
    pipeline: UploadPipeline,
    persistence: PersistenceClient,
    phase: Phase,
}

impl RegistrationController {
    pub fn new(
        config: ClientConfig,
        catalog: PhotoStepCatalog,
        camera: Arc<dyn CameraAccess>,
        api: Arc<dyn InventoryApi>,
    ) -> Result<Self> {
        Self::with_registry(config, catalog, camera, api, DisplayRegistry::new())
    }

    pub fn with_registry(
        config: ClientConfig,
        catalog: PhotoStepCatalog,
        camera: Arc<dyn CameraAccess>,
        api: Arc<dyn InventoryApi>,
        displays: DisplayRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let session =
            CaptureSession::with_registry(catalog, camera, config.jpeg_quality, displays);
        let pipeline = UploadPipeline::new(Arc::clone(&api), config.progress.clone());
        let persistence = PersistenceClient::new(api);

        Ok(Self {
            config,
            session,
            pipeline,
            persistence,
            phase: Phase::Capturing,
        })
    }

    /// Standard four-step catalog against the HTTP backend named in `config`.
    pub fn connect(config: ClientConfig, camera: Arc<dyn CameraAccess>) -> Result<Self> {
        let api = Arc::new(HttpInventoryApi::new(config.clone())?);
        Self::new(config, PhotoStepCatalog::standard(), camera, api)
    }

    pub fn with_progress_sink(mut self, sink: ProgressSender) -> Self {
        self.pipeline = self.pipeline.with_progress_sink(sink);
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn persistence(&self) -> &PersistenceClient {
        &self.persistence
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One page of stored products, `list_limit` long.
    pub async fn list_products(&self, skip: u32) -> Result<Vec<StoredProduct>, SaveError> {
        self.persistence
            .list_products(skip, self.config.list_limit)
            .await
    }

    /// Grab this before dispatching `Process` or `Retry` to cancel the upload from elsewhere.
    pub fn abort_handle(&self) -> PipelineAbort {
        self.pipeline.abort_handle()
    }

    pub async fn dispatch(&mut self, command: Command) -> Result<Outcome, RegistrationError> {
        match (command, &self.phase) {
            (Command::Reset, _) => {
                self.session.reset();
                self.phase = Phase::Capturing;
                Ok(self.capture_outcome())
            }
            (Command::Stop, _) => {
                self.session.stop();
                Ok(self.capture_outcome())
            }

            (Command::Start, Phase::Saved { .. }) => {
                self.phase = Phase::Capturing;
                self.session.start().await?;
                Ok(self.capture_outcome())
            }
            (Command::Delete(index), Phase::UploadFailed { .. }) => {
                self.session.delete(index).await?;
                self.phase = Phase::Capturing;
                Ok(self.capture_outcome())
            }
            (Command::Process, Phase::Capturing) if self.session.is_ready() => {
                self.session.stop();
                self.process().await
            }
            (Command::Retry, Phase::UploadFailed { .. }) => self.process().await,
            (Command::Recapture, Phase::UploadFailed { .. } | Phase::Review { .. }) => {
                self.session.reset();
                self.phase = Phase::Capturing;
                self.session.start().await?;
                Ok(self.capture_outcome())
            }
            (Command::Save(draft), Phase::Review { .. }) => self.save(draft).await,

            (command, Phase::Capturing) if is_capture_step(&command) => {
                self.run_capture_step(command).await?;
                Ok(self.capture_outcome())
            }

            (command, _) => Err(RegistrationError::Rejected {
                command: command.name(),
                phase: self.phase.name(),
            }),
        }
    }

    async fn run_capture_step(&mut self, command: Command) -> Result<(), RegistrationError> {
        match command {
            Command::Start => self.session.start().await.map(drop)?,
            Command::Capture => self.session.capture().await.map(drop)?,
            Command::Confirm => self.session.confirm().map(drop)?,
            Command::Retake => self.session.retake().map(drop)?,
            Command::Delete(index) => self.session.delete(index).await.map(drop)?,
            other => {
                return Err(RegistrationError::Rejected {
                    command: other.name(),
                    phase: self.phase.name(),
                })
            }
        }
        Ok(())
    }

    async fn process(&mut self) -> Result<Outcome, RegistrationError> {
        let deadline = self.config.request_deadline();
        match self.pipeline.submit(self.session.accepted(), deadline).await {
            Ok(result) => {
                let interpretation = interpret(&result);
                info!(
                    "extraction ready: {} ({} advisories)",
                    interpretation.confidence_badge(),
                    interpretation.advisories.len()
                );
                self.phase = Phase::Review {
                    draft: interpretation.draft.clone(),
                    interpretation: interpretation.clone(),
                };
                Ok(Outcome::Review { interpretation })
            }
            Err(err) => {
                warn!(
                    "upload failed with {} photos kept: {err}",
                    self.session.accepted().len()
                );
                self.phase = Phase::UploadFailed { error: err.clone() };
                Err(err.into())
            }
        }
    }

    async fn save(&mut self, draft: ProductDraft) -> Result<Outcome, RegistrationError> {
        if let Phase::Review { draft: kept, .. } = &mut self.phase {
            *kept = draft.clone();
        }

        let product = self.persistence.save(&draft).await?;

        self.session.reset();
        let voice_clip = if self.config.voice_confirmation {
            let spoken = if product.product.name.is_empty() {
                draft.name.trim()
            } else {
                product.product.name.as_str()
            };
            self.persistence.voice_confirm(spoken).await
        } else {
            None
        };

        self.phase = Phase::Saved {
            product: product.clone(),
        };
        Ok(Outcome::Saved { product, voice_clip })
    }

    fn capture_outcome(&self) -> Outcome {
        Outcome::Capture {
            snapshot: self.session.snapshot(),
        }
    }
}

fn is_capture_step(command: &Command) -> bool {
    matches!(
        command,
        Command::Start
            | Command::Capture
            | Command::Confirm
            | Command::Retake
            | Command::Delete(_)
    )
}
