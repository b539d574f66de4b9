// Asset analyzer - turns reference photos into factual text descriptions

use super::types::Asset;
use gemini::{GenerateRequest, GenerationService, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Returned without a call when no hairstyle was supplied
pub const NO_HAIRSTYLE: &str = "No hairstyle provided.";

/// Returned without a call when the garment list is empty
pub const NO_GARMENTS: &str = "No garments provided.";

/// Most garment images sent in one analysis call
pub const MAX_ANALYZED_GARMENTS: usize = 6;

/// What a reference image is analyzed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisRole {
    Model,
    Garments,
    Hairstyle,
}

impl AnalysisRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisRole::Model => "model",
            AnalysisRole::Garments => "garments",
            AnalysisRole::Hairstyle => "hairstyle",
        }
    }

    /// Instruction sent after the images
    pub fn prompt(&self) -> &'static str {
        match self {
            AnalysisRole::Model => {
                "Analyze the person in this image. Provide a highly detailed, factual description covering: face shape, eye color and shape, nose shape, lip shape, skin tone, hair color and style, estimated age, body type, and any unique features like freckles or scars. Describe them as if you were creating a character sheet for a photorealistic digital double. Output text only."
            }
            AnalysisRole::Garments => {
                "Analyze the clothing items, footwear, and accessories in these images. For each item, provide a highly detailed, factual description covering: item type (e.g., t-shirt, jeans, handbag, sneakers), exact color and material (e.g., cotton, denim, leather), texture, silhouette and fit, and any specific details like seams, buttons, zippers, hardware, logos, branding, or graphic patterns. Be extremely precise. Output text only."
            }
            AnalysisRole::Hairstyle => {
                "Analyze ONLY the hairstyle in this image. IGNORE the person, their face, and the background. Your description must be strictly limited to the hair itself. Describe its color, length, texture (e.g., curly, straight, wavy), and specific style (e.g., bob cut, ponytail, braids). Do not mention the person wearing it. Be factual and detailed. Output text only."
            }
        }
    }

    /// Description used when the service fails or answers with no text
    pub fn fallback(&self) -> &'static str {
        match self {
            AnalysisRole::Model => "A person with features as depicted in the reference image.",
            AnalysisRole::Garments => "The exact garments as shown in the reference images.",
            AnalysisRole::Hairstyle => "The hairstyle as depicted in the reference image.",
        }
    }
}

/// Issues analysis calls against the text model. Never fails.
pub struct AssetAnalyzer<'a> {
    service: &'a dyn GenerationService,
    model: &'a str,
}

impl<'a> AssetAnalyzer<'a> {
    pub fn new(service: &'a dyn GenerationService, model: &'a str) -> Self {
        Self { service, model }
    }

    /// Describe `images` in the given role
    pub async fn analyze(&self, images: &[&Asset], role: AnalysisRole) -> String {
        let request = GenerateRequest::new(self.model)
            .with_parts(images.iter().map(|a| a.part()))
            .with_part(Part::text(role.prompt()));

        debug!(role = role.as_str(), images = images.len(), "Analyzing");

        match self.service.generate(&request).await {
            Ok(response) => match response.text() {
                Some(text) => text,
                None => {
                    warn!(role = role.as_str(), "Analysis returned no text, using fallback");
                    role.fallback().to_string()
                }
            },
            Err(e) => {
                warn!(role = role.as_str(), error = %e, "Analysis failed, using fallback");
                role.fallback().to_string()
            }
        }
    }

    pub async fn analyze_model(&self, model: &Asset) -> String {
        self.analyze(&[model], AnalysisRole::Model).await
    }

    /// One call for the whole batch; at most six images are sent
    pub async fn analyze_garments(&self, garments: &[Asset]) -> String {
        if garments.is_empty() {
            return NO_GARMENTS.to_string();
        }
        let batch: Vec<&Asset> = garments.iter().take(MAX_ANALYZED_GARMENTS).collect();
        self.analyze(&batch, AnalysisRole::Garments).await
    }

    pub async fn analyze_hairstyle(&self, hairstyle: Option<&Asset>) -> String {
        match hairstyle {
            Some(asset) => self.analyze(&[asset], AnalysisRole::Hairstyle).await,
            None => NO_HAIRSTYLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tryon::testing::ScriptedService;
    use gemini::GenerateResponse;

    fn asset(name: &str) -> Asset {
        Asset::new(name, "image/png", vec![7u8; 4])
    }

    #[tokio::test]
    async fn test_absent_inputs_short_circuit() {
        let service = ScriptedService::happy();
        let analyzer = AssetAnalyzer::new(&service, "text-model");

        assert_eq!(analyzer.analyze_hairstyle(None).await, NO_HAIRSTYLE);
        assert_eq!(analyzer.analyze_garments(&[]).await, NO_GARMENTS);
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_returns_role_fallback() {
        let service = ScriptedService::failing();
        let analyzer = AssetAnalyzer::new(&service, "text-model");

        assert_eq!(
            analyzer.analyze_model(&asset("me.png")).await,
            AnalysisRole::Model.fallback()
        );
        assert_eq!(
            analyzer.analyze_garments(&[asset("a.png")]).await,
            AnalysisRole::Garments.fallback()
        );
        assert_eq!(
            analyzer.analyze_hairstyle(Some(&asset("h.png"))).await,
            AnalysisRole::Hairstyle.fallback()
        );
    }

    #[tokio::test]
    async fn test_blank_text_returns_fallback() {
        let service = ScriptedService::new(|_, _| Ok(GenerateResponse::with_text("   ")));
        let analyzer = AssetAnalyzer::new(&service, "text-model");
        assert_eq!(
            analyzer.analyze_model(&asset("me.png")).await,
            AnalysisRole::Model.fallback()
        );

        let service = ScriptedService::new(|_, _| Ok(GenerateResponse::default()));
        let analyzer = AssetAnalyzer::new(&service, "text-model");
        assert_eq!(
            analyzer.analyze_hairstyle(Some(&asset("h.png"))).await,
            AnalysisRole::Hairstyle.fallback()
        );
    }

    #[tokio::test]
    async fn test_request_shape() {
        let service = ScriptedService::new(|_, _| Ok(GenerateResponse::with_text("red wool coat")));
        let analyzer = AssetAnalyzer::new(&service, "text-model");

        let garments: Vec<Asset> = (0..8).map(|i| asset(&format!("g{i}.png"))).collect();
        let text = analyzer.analyze_garments(&garments).await;
        assert_eq!(text, "red wool coat");

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.model, "text-model");
        assert_eq!(request.image_count(), MAX_ANALYZED_GARMENTS);
        assert!(request.modalities.is_none());
        assert_eq!(
            request.parts.last(),
            Some(&Part::text(AnalysisRole::Garments.prompt()))
        );
    }
}
