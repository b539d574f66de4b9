//! Error types for the generation service client

use thiserror::Error;

/// Result type for service calls
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while talking to the generation service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("API credential not configured")]
    MissingCredential,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Image payload decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Parse(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}
