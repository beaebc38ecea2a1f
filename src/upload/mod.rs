pub mod attempt;
pub mod pipeline;
pub mod progress;

pub use attempt::{AbortHandle, Settlement, UploadAttempt};
pub use pipeline::{PipelineAbort, UploadPipeline};
pub use progress::{
    ProgressEstimator, ProgressSender, ProgressStage, ProgressTracker, ProgressUpdate,
};
