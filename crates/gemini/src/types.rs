//! Request/response model for `generateContent` and its JSON wire form

use crate::error::{Result, ServiceError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An image payload carried inline in a request or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Arc<[u8]>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// `data:` URL suitable for previews
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.data))
    }

    /// True when both images share the same underlying buffer
    pub fn shares_buffer(&self, other: &InlineImage) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// One ordered element of a request or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Image(InlineImage),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    pub fn image(image: &InlineImage) -> Self {
        Part::Image(image.clone())
    }
}

/// Output modalities a synthesis call may be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Image,
    Text,
}

/// A single call to the generation service
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub parts: Vec<Part>,
    pub modalities: Option<Vec<Modality>>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: Vec::new(),
            modalities: None,
        }
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_parts(mut self, parts: impl IntoIterator<Item = Part>) -> Self {
        self.parts.extend(parts);
        self
    }

    pub fn with_modalities(mut self, modalities: &[Modality]) -> Self {
        self.modalities = Some(modalities.to_vec());
        self
    }

    /// Number of image parts in the request
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Image(_)))
            .count()
    }

    /// Concatenation of all text parts, in order
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Encode into the JSON body sent over the wire
    pub fn to_wire(&self) -> serde_json::Value {
        // Serializing plain owned structs cannot fail
        serde_json::to_value(WireRequest::from(self)).unwrap_or(serde_json::Value::Null)
    }
}

/// First candidate returned by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<Part>,
}

/// Response to a [`GenerateRequest`]; zero or one candidate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    pub candidate: Option<Candidate>,
}

impl GenerateResponse {
    /// Response holding a single image part
    pub fn with_image(image: InlineImage) -> Self {
        Self {
            candidate: Some(Candidate {
                parts: vec![Part::Image(image)],
            }),
        }
    }

    /// Response holding a single text part
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            candidate: Some(Candidate {
                parts: vec![Part::Text(text.into())],
            }),
        }
    }

    /// First image part of the candidate, if any
    pub fn first_image(&self) -> Option<&InlineImage> {
        self.candidate.as_ref()?.parts.iter().find_map(|p| match p {
            Part::Image(img) => Some(img),
            Part::Text(_) => None,
        })
    }

    /// Joined text of the candidate; `None` when blank
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidate.as_ref()?;
        let text: String = candidate
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Image(_) => None,
            })
            .collect();

        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Parse a raw `generateContent` response body
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: WireResponse = serde_json::from_str(json)?;
        Self::try_from(wire)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    response_modalities: Vec<Modality>,
}

#[derive(Serialize, Deserialize, Default)]
pub(crate) struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    #[serde(default = "default_mime", alias = "mime_type")]
    mime_type: String,
    data: String,
}

fn default_mime() -> String {
    "image/png".to_string()
}

#[derive(Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
}

impl From<&GenerateRequest> for WireRequest {
    fn from(request: &GenerateRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => WirePart {
                    text: Some(text.clone()),
                    inline_data: None,
                },
                Part::Image(image) => WirePart {
                    text: None,
                    inline_data: Some(WireBlob {
                        mime_type: image.mime_type.clone(),
                        data: BASE64.encode(&image.data),
                    }),
                },
            })
            .collect();

        Self {
            contents: vec![WireContent {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: request
                .modalities
                .as_ref()
                .map(|m| WireGenerationConfig {
                    response_modalities: m.clone(),
                }),
        }
    }
}

impl TryFrom<WireResponse> for GenerateResponse {
    type Error = ServiceError;

    fn try_from(wire: WireResponse) -> Result<Self> {
        let Some(first) = wire.candidates.into_iter().next() else {
            return Ok(Self { candidate: None });
        };

        let mut parts = Vec::new();
        for part in first.content.unwrap_or_default().parts {
            if let Some(blob) = part.inline_data {
                if blob.data.is_empty() {
                    continue;
                }
                let bytes = BASE64.decode(blob.data.as_bytes())?;
                parts.push(Part::Image(InlineImage::new(blob.mime_type, bytes)));
            } else if let Some(text) = part.text {
                parts.push(Part::Text(text));
            }
        }

        Ok(Self {
            candidate: Some(Candidate { parts }),
        })
    }
}
