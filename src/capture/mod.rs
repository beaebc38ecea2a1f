pub mod encode;
pub mod session;
pub mod source;
pub mod state;

pub use session::CaptureSession;
pub use source::{CameraAccess, ImageSource};
pub use state::{AcceptedPhoto, CaptureSnapshot, CaptureState};
