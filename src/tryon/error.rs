// Error types for the try-on pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TryOnError>;

#[derive(Debug, Error)]
pub enum TryOnError {
    #[error("Please upload a model.")]
    MissingModel,

    #[error("API key not configured. Set GEMINI_API_KEY (or API_KEY).")]
    MissingCredential,

    #[error("Please upload an outfit or a hairstyle to generate an image.")]
    NothingToGenerate,

    #[error("No crop region selected")]
    NoCropSelection,

    #[error("No image returned: {0}")]
    NoImage(String),

    #[error("An export is already in progress")]
    ExportBusy,

    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Service error: {0}")]
    Service(#[from] gemini::ServiceError),

    #[error("Image error: {0}")]
    Composite(#[from] compositor::CompositeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
