// Crop geometry: maps an on-screen selection back onto the source image

use crate::{CompositeError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Rectangle in displayed (on-screen) pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A committed crop: the selection plus the scale it was drawn at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSelection {
    pub rect: PixelRect,
    /// Width the image was displayed at when the selection was made
    pub displayed_width: f64,
    /// Height the image was displayed at when the selection was made
    pub displayed_height: f64,
    #[serde(default = "default_pixel_ratio")]
    pub device_pixel_ratio: f64,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

/// Region of the natural-resolution image, in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropSelection {
    pub fn new(rect: PixelRect, displayed_width: f64, displayed_height: f64) -> Self {
        Self {
            rect,
            displayed_width,
            displayed_height,
            device_pixel_ratio: default_pixel_ratio(),
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    fn pixel_ratio(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Size of the rendered output: selection size times the pixel ratio
    pub fn output_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        let w = (self.rect.width * ratio).round().max(1.0) as u32;
        let h = (self.rect.height * ratio).round().max(1.0) as u32;
        (w, h)
    }

    /// Map the selection onto an image of the given natural size
    pub fn source_rect(&self, natural_width: u32, natural_height: u32) -> Result<SourceRect> {
        let r = &self.rect;
        if !(r.width > 0.0 && r.height > 0.0) {
            return Err(CompositeError::InvalidCrop(format!(
                "selection has no area ({}x{})",
                r.width, r.height
            )));
        }
        if !(self.displayed_width > 0.0 && self.displayed_height > 0.0) {
            return Err(CompositeError::InvalidCrop(
                "displayed size must be positive".into(),
            ));
        }
        if natural_width == 0 || natural_height == 0 {
            return Err(CompositeError::InvalidCrop("source image is empty".into()));
        }

        let scale_x = natural_width as f64 / self.displayed_width;
        let scale_y = natural_height as f64 / self.displayed_height;

        let x0 = (r.x * scale_x).floor().clamp(0.0, natural_width as f64);
        let y0 = (r.y * scale_y).floor().clamp(0.0, natural_height as f64);
        let x1 = ((r.x + r.width) * scale_x).ceil().clamp(0.0, natural_width as f64);
        let y1 = ((r.y + r.height) * scale_y).ceil().clamp(0.0, natural_height as f64);

        if x1 <= x0 || y1 <= y0 {
            return Err(CompositeError::InvalidCrop(
                "selection lies outside the image".into(),
            ));
        }

        Ok(SourceRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Render the selected region into a new buffer at output resolution
pub fn crop_image(image: &DynamicImage, selection: &CropSelection) -> Result<RgbaImage> {
    let source = selection.source_rect(image.width(), image.height())?;
    let (out_w, out_h) = selection.output_size();

    let region = image
        .crop_imm(source.x, source.y, source.width, source.height)
        .to_rgba8();

    if region.dimensions() == (out_w, out_h) {
        return Ok(region);
    }

    Ok(image::imageops::resize(
        &region,
        out_w,
        out_h,
        FilterType::Lanczos3,
    ))
}

/// Decode, crop and re-encode as PNG
pub fn crop_to_png(bytes: &[u8], selection: &CropSelection) -> Result<Vec<u8>> {
    let image = crate::decode(bytes)?;
    let cropped = crop_image(&image, selection)?;
    crate::encode_png(&cropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_source_rect_scales_to_natural_size() {
        // 2000x1000 image shown at 500x250
        let sel = CropSelection::new(PixelRect::new(50.0, 25.0, 100.0, 50.0), 500.0, 250.0);
        let src = sel.source_rect(2000, 1000).unwrap();
        assert_eq!(
            src,
            SourceRect {
                x: 200,
                y: 100,
                width: 400,
                height: 200
            }
        );
    }

    #[test]
    fn test_source_rect_clamped_to_bounds() {
        let sel = CropSelection::new(PixelRect::new(90.0, 90.0, 50.0, 50.0), 100.0, 100.0);
        let src = sel.source_rect(100, 100).unwrap();
        assert_eq!((src.x, src.y, src.width, src.height), (90, 90, 10, 10));
    }

    #[test]
    fn test_empty_selection_rejected() {
        let sel = CropSelection::new(PixelRect::new(0.0, 0.0, 0.0, 10.0), 100.0, 100.0);
        assert!(matches!(
            sel.source_rect(100, 100),
            Err(CompositeError::InvalidCrop(_))
        ));
    }

    #[test]
    fn test_zero_display_size_rejected() {
        let sel = CropSelection::new(PixelRect::new(0.0, 0.0, 10.0, 10.0), 0.0, 100.0);
        assert!(sel.source_rect(100, 100).is_err());
    }

    #[test]
    fn test_output_size_uses_pixel_ratio() {
        let sel = CropSelection::new(PixelRect::new(0.0, 0.0, 40.0, 30.0), 100.0, 100.0)
            .with_pixel_ratio(2.0);
        assert_eq!(sel.output_size(), (80, 60));

        let bad_ratio = sel.with_pixel_ratio(f64::NAN);
        assert_eq!(bad_ratio.output_size(), (40, 30));
    }

    #[test]
    fn test_crop_image_picks_region() {
        // Left half red, right half blue
        let mut img = RgbaImage::from_pixel(100, 50, Rgba([255, 0, 0, 255]));
        for x in 50..100 {
            for y in 0..50 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let image = DynamicImage::ImageRgba8(img);

        // Displayed at half size; select the right half
        let sel = CropSelection::new(PixelRect::new(25.0, 0.0, 25.0, 25.0), 50.0, 25.0);
        let out = crop_image(&image, &sel).unwrap();
        assert_eq!(out.dimensions(), (25, 25));
        let px = out.get_pixel(12, 12);
        assert!(px[2] > 250 && px[0] < 5);
    }
}
