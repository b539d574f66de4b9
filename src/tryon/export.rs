// Exporter - turns generated images into badge-stamped PNG downloads

use super::error::{Result, TryOnError};
use super::types::{GeneratedImage, ImageRef};
use compositor::{BadgeStamp, CollageTemplate};
use futures_util::future::join_all;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// `{outfitName}-image-{n}.png`, with `n` counted from 1
pub fn single_file_name(outfit_name: &str, pose_index: usize) -> String {
    format!("{}-image-{}.png", outfit_name, pose_index + 1)
}

/// `{outfitName}-{templateName}-collage.png`
pub fn collage_file_name(outfit_name: &str, template: CollageTemplate) -> String {
    format!("{}-{}-collage.png", outfit_name, template.name())
}

/// An encoded export ready to be saved
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Write into `dir`, creating it if needed
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        debug!(path = %path.display(), bytes = self.bytes.len(), "Wrote export");
        Ok(path)
    }
}

/// Clears the busy flag however the export ends
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TryOnError::ExportBusy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Renders single and collage exports; one export at a time
pub struct Exporter {
    client: reqwest::Client,
    stamp: BadgeStamp,
    busy: AtomicBool,
}

impl Exporter {
    pub fn new(stamp: BadgeStamp) -> Self {
        Self::with_client(reqwest::Client::new(), stamp)
    }

    pub fn with_client(client: reqwest::Client, stamp: BadgeStamp) -> Self {
        Self {
            client,
            stamp,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Decode an inline image or fetch a placeholder
    pub async fn load_image(&self, image: &ImageRef) -> Result<DynamicImage> {
        match image {
            ImageRef::Inline(inline) => Ok(compositor::decode(&inline.data)?),
            ImageRef::Placeholder(url) => {
                let bytes = self.fetch(url).await?;
                Ok(compositor::decode(&bytes)?)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "Fetching placeholder");
        let fetch_err = |e: reqwest::Error| TryOnError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?;
        let bytes = response.bytes().await.map_err(fetch_err)?;
        Ok(bytes.to_vec())
    }

    /// One image at natural size with the badge
    pub async fn export_single(
        &self,
        outfit_name: &str,
        image: &GeneratedImage,
    ) -> Result<ExportedFile> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let source = self.load_image(&image.image).await.inspect_err(|e| {
            warn!(image = %image.id, error = %e, "Could not load image for export");
        })?;
        let canvas = compositor::render_single(&source, &self.stamp);
        let bytes = compositor::encode_png(&canvas)?;

        let file_name = single_file_name(outfit_name, image.pose_index);
        info!(file = %file_name, "Exported image");
        Ok(ExportedFile { file_name, bytes })
    }

    /// A collage of the first images that fit `template`, with the badge
    pub async fn export_collage(
        &self,
        outfit_name: &str,
        template: CollageTemplate,
        images: &[GeneratedImage],
    ) -> Result<ExportedFile> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let selected = &images[..images.len().min(template.capacity())];
        let loaded = join_all(selected.iter().map(|i| self.load_image(&i.image))).await;
        let sources = loaded.into_iter().collect::<Result<Vec<_>>>()?;

        let collage = compositor::render_collage(template, &sources, &self.stamp)?;
        let bytes = compositor::encode_png(&collage.canvas)?;

        let file_name = collage_file_name(outfit_name, template);
        info!(file = %file_name, panels = collage.panels_drawn, "Exported collage");
        Ok(ExportedFile { file_name, bytes })
    }
}
