// Collage layouts: fixed-size canvas with gapped panels

use crate::{CompositeError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collage canvas edge length
pub const COLLAGE_SIZE: u32 = 1024;

/// Gap between panels
pub const COLLAGE_GAP: u32 = 8;

/// Fill drawn before any panel (#171717)
pub const COLLAGE_BACKGROUND: Rgba<u8> = Rgba([0x17, 0x17, 0x17, 0xff]);

/// Available collage layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollageTemplate {
    /// First four images in equal quadrants
    #[serde(rename = "2x2")]
    Grid2x2,
    /// First image on the full-height left half, next two stacked on the right
    #[serde(rename = "3-panel")]
    ThreePanel,
}

impl CollageTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grid2x2 => "2x2",
            Self::ThreePanel => "3-panel",
        }
    }

    /// Panel rectangles for a square canvas of `size` with `gap` between panels
    pub fn panels(&self, size: u32, gap: u32) -> Vec<Panel> {
        let half = (size - gap) / 2;
        let second = half + gap;
        match self {
            Self::Grid2x2 => vec![
                Panel::new(0, 0, half, half),
                Panel::new(second, 0, half, half),
                Panel::new(0, second, half, half),
                Panel::new(second, second, half, half),
            ],
            Self::ThreePanel => vec![
                Panel::new(0, 0, half, size),
                Panel::new(second, 0, half, half),
                Panel::new(second, second, half, half),
            ],
        }
    }

    /// How many images the layout consumes
    pub fn capacity(&self) -> usize {
        self.panels(COLLAGE_SIZE, COLLAGE_GAP).len()
    }
}

impl fmt::Display for CollageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CollageTemplate {
    type Err = CompositeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "2x2" | "grid" => Ok(Self::Grid2x2),
            "3-panel" | "3panel" | "three-panel" => Ok(Self::ThreePanel),
            other => Err(CompositeError::UnknownTemplate(other.to_string())),
        }
    }
}

/// Destination rectangle on the collage canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Panel {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Composited collage and how many panels received an image
#[derive(Debug, Clone)]
pub struct Collage {
    pub template: CollageTemplate,
    pub canvas: RgbaImage,
    pub panels_drawn: usize,
}

/// Draw up to `template.capacity()` images onto a fresh canvas.
///
/// Panels without an image keep the background fill.
pub fn compose_collage(template: CollageTemplate, images: &[DynamicImage]) -> Result<Collage> {
    if images.is_empty() {
        return Err(CompositeError::Empty("collage needs at least one image".into()));
    }

    let mut canvas = RgbaImage::from_pixel(COLLAGE_SIZE, COLLAGE_SIZE, COLLAGE_BACKGROUND);
    let panels = template.panels(COLLAGE_SIZE, COLLAGE_GAP);

    let mut drawn = 0;
    for (panel, image) in panels.iter().zip(images) {
        let scaled = imageops::resize(image, panel.width, panel.height, FilterType::Triangle);
        imageops::overlay(&mut canvas, &scaled, panel.x as i64, panel.y as i64);
        drawn += 1;
    }

    tracing::debug!(
        template = template.name(),
        drawn,
        available = images.len(),
        "Collage composed"
    );

    Ok(Collage {
        template,
        canvas,
        panels_drawn: drawn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 96, Rgba(color)))
    }

    #[test]
    fn test_grid_panels() {
        let panels = CollageTemplate::Grid2x2.panels(1024, 8);
        assert_eq!(panels.len(), 4);
        assert_eq!(panels[0], Panel::new(0, 0, 508, 508));
        assert_eq!(panels[3], Panel::new(516, 516, 508, 508));
    }

    #[test]
    fn test_three_panel_layout() {
        let panels = CollageTemplate::ThreePanel.panels(1024, 8);
        assert_eq!(panels.len(), 3);
        assert_eq!(panels[0], Panel::new(0, 0, 508, 1024));
        assert_eq!(panels[1], Panel::new(516, 0, 508, 508));
        assert_eq!(panels[2], Panel::new(516, 516, 508, 508));
    }

    #[test]
    fn test_grid_with_two_images_leaves_background() {
        let red = [255, 0, 0, 255];
        let images = vec![solid(red), solid(red)];
        let collage = compose_collage(CollageTemplate::Grid2x2, &images).unwrap();

        assert_eq!(collage.panels_drawn, 2);
        assert_eq!(collage.canvas.dimensions(), (1024, 1024));
        assert_eq!(collage.canvas.get_pixel(100, 100), &Rgba(red));
        assert_eq!(collage.canvas.get_pixel(700, 100), &Rgba(red));
        // Bottom row is empty, and so is the gap
        assert_eq!(collage.canvas.get_pixel(100, 700), &COLLAGE_BACKGROUND);
        assert_eq!(collage.canvas.get_pixel(700, 700), &COLLAGE_BACKGROUND);
        assert_eq!(collage.canvas.get_pixel(511, 100), &COLLAGE_BACKGROUND);
    }

    #[test]
    fn test_grid_with_one_image_draws_one_panel() {
        let blue = [0, 0, 255, 255];
        let collage = compose_collage(CollageTemplate::Grid2x2, &[solid(blue)]).unwrap();

        assert_eq!(collage.panels_drawn, 1);
        assert_eq!(collage.canvas.get_pixel(100, 100), &Rgba(blue));
        assert_eq!(collage.canvas.get_pixel(700, 100), &COLLAGE_BACKGROUND);
        assert_eq!(collage.canvas.get_pixel(100, 700), &COLLAGE_BACKGROUND);
        assert_eq!(collage.canvas.get_pixel(700, 700), &COLLAGE_BACKGROUND);
    }

    #[test]
    fn test_extra_images_ignored() {
        let images: Vec<_> = (0..5).map(|_| solid([0, 255, 0, 255])).collect();
        let collage = compose_collage(CollageTemplate::ThreePanel, &images).unwrap();
        assert_eq!(collage.panels_drawn, 3);
    }

    #[test]
    fn test_empty_collage_is_error() {
        assert!(matches!(
            compose_collage(CollageTemplate::Grid2x2, &[]),
            Err(CompositeError::Empty(_))
        ));
    }

    #[test]
    fn test_template_parse() {
        assert_eq!("2x2".parse::<CollageTemplate>().unwrap(), CollageTemplate::Grid2x2);
        assert_eq!(
            "3-Panel".parse::<CollageTemplate>().unwrap(),
            CollageTemplate::ThreePanel
        );
        assert!("mosaic".parse::<CollageTemplate>().is_err());
        assert_eq!(CollageTemplate::ThreePanel.to_string(), "3-panel");
    }
}
