//! Error types for guidepath-eye

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "camera")]
    #[error("OpenCV error: {0}")]
    OpenCv(String),
}

impl VisionError {
    /// Whether the failure comes from the bytes a client sent
    pub fn is_client_error(&self) -> bool {
        matches!(self, VisionError::Decode(_))
    }
}

#[cfg(feature = "camera")]
impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}
