// Non-destructive editing of uploaded assets
//
// Every edit is computed from the untouched original and replaces only the
// current value; revert lives on Editable itself.

use super::error::{Result, TryOnError};
use super::types::{Asset, EditHistory, Editable};
use compositor::CropSelection;
use gemini::{GenerateRequest, GenerationService, Modality, Part};
use tracing::{debug, info, warn};

pub const BLUR_FACE_PROMPT: &str = "Find any human faces in this image and apply a strong, feature-obscuring gaussian blur to them. Do not alter any other part of the image, including hair, background, or clothing. The output MUST be only the edited image, with no added text or explanation.";

impl Editable<Asset> {
    /// Crop the original to `selection` and make the result current.
    ///
    /// On error the asset is left exactly as it was.
    pub fn crop(&mut self, selection: Option<&CropSelection>) -> Result<()> {
        let selection = selection.ok_or(TryOnError::NoCropSelection)?;
        let png = compositor::crop_to_png(self.original().bytes(), selection)?;

        let (w, h) = selection.output_size();
        debug!(file = %self.original().file_name, w, h, "Cropped asset");

        let cropped = Asset::new(self.original().file_name.clone(), "image/png", png);
        self.replace_current(
            cropped,
            EditHistory {
                blurred: false,
                crop: Some(*selection),
            },
        );
        Ok(())
    }

    /// Ask the image model to blur faces in the original.
    ///
    /// On error the asset is left exactly as it was.
    pub async fn blur_face(&mut self, service: &dyn GenerationService, model: &str) -> Result<()> {
        if !service.is_configured() {
            return Err(TryOnError::MissingCredential);
        }

        let request = GenerateRequest::new(model)
            .with_part(self.original().part())
            .with_part(Part::text(BLUR_FACE_PROMPT))
            .with_modalities(&[Modality::Image]);

        let response = service.generate(&request).await.map_err(|e| {
            warn!(file = %self.original().file_name, error = %e, "Face blur failed");
            e
        })?;

        let image = response.first_image().cloned().ok_or_else(|| {
            warn!(file = %self.original().file_name, "Face blur returned no image");
            TryOnError::NoImage("Failed to blur face: No image data returned.".into())
        })?;

        let file_name = format!("blurred-{}", self.original().file_name);
        info!(file = %file_name, "Blurred faces");
        self.replace_current(
            Asset {
                file_name,
                image,
            },
            EditHistory {
                blurred: true,
                crop: None,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tryon::testing::{png_image, ScriptedService};
    use compositor::PixelRect;
    use gemini::GenerateResponse;
    use image::{Rgba, RgbaImage};

    /// 100x50 image, red on the left half and blue on the right
    fn split_asset() -> Asset {
        let canvas = RgbaImage::from_fn(100, 50, |x, _| {
            if x < 50 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        Asset::new("look.png", "image/png", compositor::encode_png(&canvas).unwrap())
    }

    fn decoded(asset: &Asset) -> RgbaImage {
        compositor::decode(asset.bytes()).unwrap().to_rgba8()
    }

    #[test]
    fn test_crop_without_selection_is_rejected() {
        let mut editable = Editable::new(split_asset());
        let err = editable.crop(None).unwrap_err();
        assert!(matches!(err, TryOnError::NoCropSelection));
        assert!(editable.current().shares_content(editable.original()));
    }

    #[test]
    fn test_zero_size_crop_leaves_state() {
        let mut editable = Editable::new(split_asset());
        let selection = CropSelection::new(PixelRect::new(10.0, 10.0, 0.0, 5.0), 100.0, 50.0);
        let err = editable.crop(Some(&selection)).unwrap_err();
        assert!(matches!(err, TryOnError::Composite(_)));
        assert!(editable.current().shares_content(editable.original()));
        assert!(editable.history().crop.is_none());
    }

    #[test]
    fn test_crop_scales_from_display_and_uses_pixel_ratio() {
        let mut editable = Editable::new(split_asset());
        // displayed at half size; the left quarter of the display is red
        let selection = CropSelection::new(PixelRect::new(0.0, 0.0, 20.0, 25.0), 50.0, 25.0)
            .with_pixel_ratio(2.0);
        editable.crop(Some(&selection)).unwrap();

        let current = editable.current();
        assert_eq!(current.mime_type(), "image/png");
        assert_eq!(current.file_name, "look.png");
        let pixels = decoded(current);
        assert_eq!(pixels.dimensions(), (40, 50));
        let px = pixels.get_pixel(20, 25);
        assert!(px[0] > 250 && px[2] < 5);
        assert_eq!(editable.history().crop, Some(selection));
    }

    #[test]
    fn test_second_crop_uses_original() {
        let mut editable = Editable::new(split_asset());
        let left = CropSelection::new(PixelRect::new(0.0, 0.0, 40.0, 50.0), 100.0, 50.0);
        editable.crop(Some(&left)).unwrap();

        // this region only exists in the original
        let right = CropSelection::new(PixelRect::new(60.0, 0.0, 40.0, 50.0), 100.0, 50.0);
        editable.crop(Some(&right)).unwrap();

        let pixels = decoded(editable.current());
        let px = pixels.get_pixel(20, 25);
        assert!(px[2] > 250 && px[0] < 5);
        assert_eq!(decoded(editable.original()).dimensions(), (100, 50));
    }

    #[tokio::test]
    async fn test_blur_replaces_current_and_revert_restores() {
        let service = ScriptedService::happy();
        let mut editable = Editable::new(split_asset());

        editable.blur_face(&service, "image-model").await.unwrap();
        assert!(editable.is_blurred());
        assert_eq!(editable.current().file_name, "blurred-look.png");

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "image-model");
        assert_eq!(requests[0].modalities.as_deref(), Some(&[Modality::Image][..]));
        assert_eq!(requests[0].parts[0], editable.original().part());
        assert_eq!(requests[0].parts[1], Part::text(BLUR_FACE_PROMPT));

        editable.revert();
        assert!(!editable.is_blurred());
        assert!(editable.current().shares_content(editable.original()));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blur_sends_original_after_crop() {
        let service = ScriptedService::new(|_, _| Ok(GenerateResponse::with_image(png_image())));
        let mut editable = Editable::new(split_asset());
        let left = CropSelection::new(PixelRect::new(0.0, 0.0, 40.0, 50.0), 100.0, 50.0);
        editable.crop(Some(&left)).unwrap();

        editable.blur_face(&service, "image-model").await.unwrap();
        assert_eq!(service.requests()[0].parts[0], editable.original().part());
        assert!(editable.history().crop.is_none());
    }

    #[tokio::test]
    async fn test_blur_failures_leave_state() {
        let mut editable = Editable::new(split_asset());

        let err = editable
            .blur_face(&ScriptedService::unconfigured(), "m")
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::MissingCredential));

        let err = editable
            .blur_face(&ScriptedService::failing(), "m")
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::Service(_)));

        let text_only = ScriptedService::new(|_, _| Ok(GenerateResponse::with_text("no")));
        let err = editable.blur_face(&text_only, "m").await.unwrap_err();
        assert!(matches!(err, TryOnError::NoImage(_)));

        assert!(!editable.is_blurred());
        assert!(editable.current().shares_content(editable.original()));
    }
}
