// Error types for compositor

use thiserror::Error;

/// Result type for compositor operations
pub type Result<T> = std::result::Result<T, CompositeError>;

/// Errors that can occur while cropping, compositing or encoding
#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Nothing to export: {0}")]
    Empty(String),

    #[error("Unknown collage template: {0}")]
    UnknownTemplate(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for CompositeError {
    fn from(err: image::ImageError) -> Self {
        CompositeError::ImageProcessing(err.to_string())
    }
}
