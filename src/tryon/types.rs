// Core types for the try-on pipeline

use super::error::{Result, TryOnError};
use super::storyboard::{self, StoryboardElement};
use compositor::CropSelection;
use gemini::{InlineImage, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Most garments an outfit can hold
pub const MAX_GARMENTS: usize = 6;

/// Most outfits a session can hold
pub const MAX_OUTFITS: usize = 3;

/// Id of the synthetic job created when only a hairstyle is supplied
pub const HAIRSTYLE_ONLY_JOB_ID: &str = "hairstyle-only";

/// Display name of the hairstyle-only job
pub const HAIRSTYLE_ONLY_JOB_NAME: &str = "Hairstyle Try-On";

/// An image payload plus the file name it arrived under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub file_name: String,
    pub image: InlineImage,
}

impl Asset {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<std::sync::Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            image: InlineImage::new(mime_type, data),
        }
    }

    /// Read an image from disk, deriving the MIME type from its extension
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| TryOnError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self::new(file_name, mime_for_path(path), data))
    }

    pub fn mime_type(&self) -> &str {
        &self.image.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.image.data
    }

    /// Request part carrying this image
    pub fn part(&self) -> Part {
        Part::image(&self.image)
    }

    pub fn preview_url(&self) -> String {
        self.image.to_data_url()
    }

    /// True when both assets share one payload buffer
    pub fn shares_content(&self, other: &Asset) -> bool {
        self.image.shares_buffer(&other.image)
    }
}

/// MIME type for an image path, by extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => "image/png",
    }
}

/// What has been applied to an editable asset's current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditHistory {
    pub blurred: bool,
    pub crop: Option<CropSelection>,
}

/// A value with an immutable original and a derived, replaceable current.
///
/// `current` is only ever replaced with something derived from `original`.
#[derive(Debug, Clone)]
pub struct Editable<T> {
    original: T,
    current: T,
    history: EditHistory,
}

impl<T: Clone> Editable<T> {
    pub fn new(original: T) -> Self {
        Self {
            current: original.clone(),
            original,
            history: EditHistory::default(),
        }
    }

    pub fn original(&self) -> &T {
        &self.original
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn is_blurred(&self) -> bool {
        self.history.blurred
    }

    /// Restore `current` to `original` and forget all edits
    pub fn revert(&mut self) {
        self.current = self.original.clone();
        self.history = EditHistory::default();
    }

    pub(crate) fn replace_current(&mut self, value: T, history: EditHistory) {
        self.current = value;
        self.history = history;
    }
}

impl Editable<Asset> {
    pub fn original_preview_url(&self) -> String {
        self.original.preview_url()
    }

    pub fn current_preview_url(&self) -> String {
        self.current.preview_url()
    }
}

/// One clothing item, footwear or accessory
#[derive(Debug, Clone)]
pub struct Garment {
    pub id: String,
    pub asset: Editable<Asset>,
}

impl Garment {
    pub fn new(id: impl Into<String>, asset: Asset) -> Self {
        Self {
            id: id.into(),
            asset: Editable::new(asset),
        }
    }
}

/// Hairstyle reference photo; blurring its face is reversible
pub type Hairstyle = Editable<Asset>;

/// An ordered set of garments rendered together
#[derive(Debug, Clone)]
pub struct Outfit {
    pub id: String,
    pub name: String,
    garments: Vec<Garment>,
}

impl Outfit {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            garments: Vec::new(),
        }
    }

    /// Append a garment; returns false once the outfit is full
    pub fn add_garment(&mut self, garment: Garment) -> bool {
        if self.garments.len() >= MAX_GARMENTS {
            return false;
        }
        self.garments.push(garment);
        true
    }

    pub fn remove_garment(&mut self, garment_id: &str) {
        self.garments.retain(|g| g.id != garment_id);
    }

    pub fn garments(&self) -> &[Garment] {
        &self.garments
    }

    pub fn garment_mut(&mut self, garment_id: &str) -> Option<&mut Garment> {
        self.garments.iter_mut().find(|g| g.id == garment_id)
    }

    pub fn has_garments(&self) -> bool {
        !self.garments.is_empty()
    }
}

/// Everything a generation run needs, owned by the caller
#[derive(Debug, Clone)]
pub struct TryOnSession {
    pub model: Option<Asset>,
    outfits: Vec<Outfit>,
    pub hairstyle: Option<Hairstyle>,
    pub storyboard: Vec<StoryboardElement>,
    pub face_lock: bool,
}

impl TryOnSession {
    pub fn new() -> Self {
        Self {
            model: None,
            outfits: Vec::new(),
            hairstyle: None,
            storyboard: Vec::new(),
            face_lock: true,
        }
    }

    /// Add an outfit; returns false once the session is full
    pub fn add_outfit(&mut self, outfit: Outfit) -> bool {
        if self.outfits.len() >= MAX_OUTFITS {
            return false;
        }
        self.outfits.push(outfit);
        true
    }

    pub fn remove_outfit(&mut self, outfit_id: &str) {
        self.outfits.retain(|o| o.id != outfit_id);
    }

    pub fn outfits(&self) -> &[Outfit] {
        &self.outfits
    }

    pub fn outfit_mut(&mut self, outfit_id: &str) -> Option<&mut Outfit> {
        self.outfits.iter_mut().find(|o| o.id == outfit_id)
    }

    pub fn set_hairstyle(&mut self, asset: Asset) {
        self.hairstyle = Some(Editable::new(asset));
    }

    /// Free-text creative direction gathered from the storyboard
    pub fn instructions(&self) -> String {
        storyboard::instructions(&self.storyboard)
    }

    /// Whether the session could start a run (ignoring the credential)
    pub fn can_generate(&self) -> bool {
        self.model.is_some()
            && (self.hairstyle.is_some() || self.outfits.iter().any(Outfit::has_garments))
    }
}

impl Default for TryOnSession {
    fn default() -> Self {
        Self::new()
    }
}

/// One outfit (or the hairstyle-only sentinel) scheduled for all poses
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub id: String,
    pub name: String,
    /// Current garment assets, in outfit order
    pub garments: Vec<Asset>,
}

impl GenerationJob {
    pub fn from_outfit(outfit: &Outfit) -> Self {
        Self {
            id: outfit.id.clone(),
            name: outfit.name.clone(),
            garments: outfit
                .garments()
                .iter()
                .map(|g| g.asset.current().clone())
                .collect(),
        }
    }

    pub fn hairstyle_only() -> Self {
        Self {
            id: HAIRSTYLE_ONLY_JOB_ID.to_string(),
            name: HAIRSTYLE_ONLY_JOB_NAME.to_string(),
            garments: Vec::new(),
        }
    }
}

/// Where a generated image's pixels come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Synthesized image returned by the service
    Inline(InlineImage),
    /// Stand-in URL used when a pose produced no image
    Placeholder(String),
}

impl ImageRef {
    /// Displayable source: a data URL or the placeholder URL
    pub fn src(&self) -> String {
        match self {
            ImageRef::Inline(image) => image.to_data_url(),
            ImageRef::Placeholder(url) => url.clone(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageRef::Placeholder(_))
    }
}

/// One pose of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub id: String,
    pub pose_index: usize,
    pub image: ImageRef,
}

impl GeneratedImage {
    pub(crate) fn new(job_id: &str, pose_index: usize, image: ImageRef) -> Self {
        Self {
            id: format!("{}-{}", job_id, pose_index),
            pose_index,
            image,
        }
    }
}

/// Short description of a job for events and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub name: String,
}

impl From<&GenerationJob> for JobSummary {
    fn from(job: &GenerationJob) -> Self {
        Self {
            id: job.id.clone(),
            name: job.name.clone(),
        }
    }
}
