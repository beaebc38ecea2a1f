//! Capture-to-submission workflow for registering catalog products from photos.
//!
//! A [`RegistrationController`] owns one [`CaptureSession`], submits its photos through the
//! [`UploadPipeline`], turns the extraction into a review draft with [`interpret`], and
//! stores the edited draft through the [`PersistenceClient`].

pub mod api;
pub mod capture;
pub mod config;
pub mod error;
pub mod interpret;
pub mod models;
pub mod persistence;
pub mod registration;
pub mod upload;
pub mod utils;

pub use api::{HttpInventoryApi, InventoryApi};
pub use capture::{CameraAccess, CaptureSession, CaptureState, ImageSource};
pub use config::{ClientConfig, ProgressConfig};
pub use error::{CaptureError, RegistrationError, SaveError, TransportError, UploadError};
pub use interpret::{interpret, ConfidenceTier, Interpretation};
pub use models::{ExtractionResult, PhotoRecord, PhotoStepCatalog, ProductDraft, SavedProduct};
pub use persistence::PersistenceClient;
pub use registration::{Command, Outcome, Phase, RegistrationController};
pub use upload::{PipelineAbort, ProgressUpdate, UploadPipeline};

/// Install the `env_logger` backend. Repeated calls are ignored.
pub fn init_logging() {
    utils::logging::init();
}
