//! Seam to the platform camera. Acquiring and rendering live video happens outside this crate;
//! the session only opens the capability, reads single stills from it and stops it.

use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;

#[async_trait]
pub trait CameraAccess: Send + Sync {
    /// Ask the platform for the camera. An `Err` means access was denied or no device exists.
    async fn acquire(&self) -> Result<Box<dyn ImageSource>>;
}

/// An open camera stream.
pub trait ImageSource: Send {
    fn read_frame(&mut self) -> Result<DynamicImage>;

    /// Release the device. Called at most once per acquired source.
    fn stop(&mut self);
}
