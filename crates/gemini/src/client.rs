//! Gemini `generateContent` API client

use crate::error::{Result, ServiceError};
use crate::types::{GenerateRequest, GenerateResponse, WireRequest, WireResponse};
use crate::GenerationService;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// HTTP client for the generation service
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a client against the public endpoint
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(
            DEFAULT_ENDPOINT,
            api_key,
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
    }

    /// Create a client with a custom endpoint and request timeout
    pub fn with_options(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Get the reqwest client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Get the base endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL of the `generateContent` method for a model
    pub fn endpoint_for_model(&self, model: &str) -> String {
        let model = model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/v1beta/{}:generateContent", self.endpoint, model_path)
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredential)?;

        let url = self.endpoint_for_model(&request.model);
        tracing::debug!(
            model = %request.model,
            parts = request.parts.len(),
            images = request.image_count(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&WireRequest::from(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        GenerateResponse::try_from(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_for_model() {
        let client = GeminiClient::new(Some("key".to_string())).unwrap();
        let expected = concat!(
            "https://generativelanguage.googleapis.com",
            "/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.endpoint_for_model("gemini-2.5-flash"), expected);
        assert_eq!(client.endpoint_for_model("models/gemini-2.5-flash"), expected);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            GeminiClient::with_options("http://localhost:8080/", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let client = GeminiClient::new(Some("   ".to_string())).unwrap();
        assert!(!client.is_configured());
        assert!(GeminiClient::new(Some("abc".to_string())).unwrap().is_configured());
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_fast() {
        let client = GeminiClient::new(None).unwrap();
        let result = client
            .generate(&GenerateRequest::new("gemini-2.5-flash"))
            .await;
        assert!(matches!(result, Err(ServiceError::MissingCredential)));
    }
}
