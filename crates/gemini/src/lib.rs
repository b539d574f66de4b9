//! Client for the multimodal generation/analysis service
//!
//! Requests are ordered lists of text and inline image parts; responses carry
//! at most one candidate whose parts may hold text or images.

pub mod client;
pub mod error;
pub mod types;

pub use client::GeminiClient;
pub use error::{Result, ServiceError};
pub use types::{Candidate, GenerateRequest, GenerateResponse, InlineImage, Modality, Part};

use async_trait::async_trait;

/// A remote capability that answers [`GenerateRequest`]s
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Whether a credential is available; checked before any call is made
    fn is_configured(&self) -> bool;

    /// Issue one request and wait for its response
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}
