//! Configuration file support for fitboard

use crate::tryon::orchestrator::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::tryon::TryOnSettings;
use compositor::BadgeStamp;
use gemini::GeminiClient;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables checked for the service credential, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitboardConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model used for analysis calls
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for synthesis, face blur and enhancement
    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// TrueType font for the badge; the bundled DejaVu Sans when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_font: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_face_lock")]
    pub face_lock: bool,
}

// Defaults

fn default_endpoint() -> String {
    gemini::client::DEFAULT_ENDPOINT.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_timeout_ms() -> u64 {
    gemini::client::DEFAULT_TIMEOUT_MS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("fitboard-output")
}

fn default_face_lock() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            badge_font: None,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            face_lock: default_face_lock(),
        }
    }
}

impl FitboardConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: FitboardConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `~/.config/fitboard/config.toml` (or the platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("fitboard").join("config.toml"))
    }

    /// An explicit path must exist; the default path is optional
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    tracing::debug!(path = %path.display(), "Loading config");
                    Self::from_file(path)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn settings(&self) -> TryOnSettings {
        TryOnSettings {
            text_model: self.service.text_model.clone(),
            image_model: self.service.image_model.clone(),
        }
    }

    /// Client for the configured endpoint; unconfigured without a key
    pub fn build_client(&self, api_key: Option<String>) -> anyhow::Result<GeminiClient> {
        let client = GeminiClient::with_options(
            self.service.endpoint.clone(),
            api_key,
            Duration::from_millis(self.service.timeout_ms),
        )?;
        Ok(client)
    }

    pub fn badge_stamp(&self) -> anyhow::Result<BadgeStamp> {
        match &self.export.badge_font {
            Some(path) => Ok(BadgeStamp::with_font_file(path)?),
            None => Ok(BadgeStamp::new()?),
        }
    }
}

/// First non-blank credential from the environment
pub fn api_key() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}
