use thiserror::Error;

use crate::models::FieldName;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("no camera is open for this session")]
    NoActiveCapability,

    #[error("a capture is already waiting for confirmation")]
    CaptureAlreadyPending,

    #[error("there is no capture waiting for confirmation")]
    NoPendingCapture,

    #[error("every capture step already has a photo")]
    AllStepsCaptured,

    #[error("photo index {index} is out of range for {len} photos")]
    InvalidPhotoIndex { index: usize, len: usize },

    #[error("camera did not deliver a frame: {0}")]
    FrameUnavailable(String),

    #[error("could not encode the frame as JPEG: {0}")]
    Encoding(String),
}

impl CaptureError {
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::CapabilityUnavailable(_) => {
                "The camera cannot be accessed. Check the camera permissions.".into()
            }
            CaptureError::NoActiveCapability => "Open the camera before taking a photo.".into(),
            CaptureError::FrameUnavailable(_) | CaptureError::Encoding(_) => {
                "The photo could not be taken. Try again.".into()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("at least one photo is required")]
    EmptyCapture,

    #[error("extraction did not finish within {deadline_ms} ms")]
    Timeout { deadline_ms: u64 },

    #[error("upload aborted by the operator")]
    Aborted,

    #[error("extraction service returned HTTP {status}")]
    ServerError { status: u16, body: String },

    #[error("could not reach the extraction service: {message}")]
    NetworkFailure { message: String },

    #[error("extraction response was not understood: {message}")]
    InvalidResponse { message: String },

    #[error("an upload is already in progress")]
    InFlight,
}

impl UploadError {
    /// Failures the operator can retry with the same photos.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UploadError::Timeout { .. }
                | UploadError::Aborted
                | UploadError::ServerError { .. }
                | UploadError::NetworkFailure { .. }
                | UploadError::InvalidResponse { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            UploadError::EmptyCapture => "Take at least one photo first.".into(),
            UploadError::Timeout { deadline_ms } => format!(
                "Text recognition took too long. It can take up to {} minutes; please try again.",
                minutes_rounded_up(*deadline_ms)
            ),
            UploadError::Aborted => "Processing was cancelled.".into(),
            UploadError::ServerError { status, .. } => {
                format!("The server reported an error (HTTP {status}).")
            }
            UploadError::NetworkFailure { .. } => {
                "The connection to the server failed. Check the network and retry.".into()
            }
            UploadError::InvalidResponse { .. } => {
                "The server sent a response that could not be read.".into()
            }
            UploadError::InFlight => "The photos are already being processed.".into(),
        }
    }
}

fn minutes_rounded_up(ms: u64) -> u64 {
    ms.div_ceil(60_000).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("required fields missing or invalid: {}", field_list(.fields))]
    Validation { fields: Vec<FieldName> },

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("could not reach the inventory service: {message}")]
    NetworkFailure { message: String },

    #[error("a save is already in progress")]
    InFlight,
}

impl SaveError {
    pub fn user_message(&self) -> String {
        match self {
            SaveError::Validation { fields } => format!(
                "Please complete the required fields: {}",
                fields
                    .iter()
                    .map(FieldName::label)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            SaveError::Rejected { message, .. } => message.clone(),
            SaveError::NetworkFailure { .. } => {
                "The product could not be saved: connection failed.".into()
            }
            SaveError::InFlight => "The product is already being saved.".into(),
        }
    }
}

fn field_list(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(FieldName::wire_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raised by the HTTP seam when a request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Anything `RegistrationController::dispatch` can refuse or fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("'{command}' is not available while {phase}")]
    Rejected {
        command: &'static str,
        phase: &'static str,
    },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Save(#[from] SaveError),
}

impl RegistrationError {
    pub fn user_message(&self) -> String {
        match self {
            RegistrationError::Rejected { .. } => self.to_string(),
            RegistrationError::Capture(err) => err.user_message(),
            RegistrationError::Upload(err) => err.user_message(),
            RegistrationError::Save(err) => err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_expected_duration() {
        let timeout = UploadError::Timeout { deadline_ms: 120_000 };
        assert!(timeout.user_message().contains("2 minutes"));
        assert!(timeout.is_retryable());

        let server = UploadError::ServerError { status: 500, body: "boom".into() };
        let network = UploadError::NetworkFailure { message: "refused".into() };
        assert_ne!(timeout.user_message(), server.user_message());
        assert_ne!(server.user_message(), network.user_message());
        assert!(!UploadError::EmptyCapture.is_retryable());
    }

    #[test]
    fn validation_message_lists_field_labels() {
        let err = SaveError::Validation {
            fields: vec![FieldName::Name, FieldName::Size],
        };
        assert_eq!(err.to_string(), "required fields missing or invalid: name, size");
        assert_eq!(
            err.user_message(),
            "Please complete the required fields: Product name, Size"
        );
    }

    #[test]
    fn registration_errors_defer_to_the_wrapped_message() {
        let err = RegistrationError::from(UploadError::Aborted);
        assert_eq!(err.user_message(), "Processing was cancelled.");

        let rejected = RegistrationError::Rejected {
            command: "save",
            phase: "capturing",
        };
        assert_eq!(rejected.user_message(), "'save' is not available while capturing");
    }
}
