//! Provenance badge stamped on every exported image
//!
//! A translucent rounded label anchored bottom-right. All measurements are
//! defined against a 512px-wide canvas and scaled with the real width.

use crate::{CompositeError, Result};
use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Literal text of the badge
pub const BADGE_TEXT: &str = "AI-edited";

const REFERENCE_WIDTH: f32 = 512.0;
const BADGE_WIDTH: f32 = 90.0;
const BADGE_HEIGHT: f32 = 20.0;
const BADGE_PADDING: f32 = 10.0;
const BADGE_RADIUS: f32 = 5.0;
const BADGE_FONT_SIZE: f32 = 10.0;
const BADGE_OPACITY: f32 = 0.6;
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// DejaVu Sans, shipped so badges render the same on every host
static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Badge placement on a particular canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub font_size: f32,
}

impl BadgeGeometry {
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let scale = width as f32 / REFERENCE_WIDTH;
        let badge_w = BADGE_WIDTH * scale;
        let badge_h = BADGE_HEIGHT * scale;
        let padding = BADGE_PADDING * scale;
        Self {
            x: width as f32 - badge_w - padding,
            y: height as f32 - badge_h - padding,
            width: badge_w,
            height: badge_h,
            radius: BADGE_RADIUS * scale,
            font_size: BADGE_FONT_SIZE * scale,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether a point lies inside the rounded rectangle
    pub fn contains(&self, px: f32, py: f32) -> bool {
        if px < self.x || py < self.y || px > self.x + self.width || py > self.y + self.height {
            return false;
        }
        let r = self.radius.min(self.width / 2.0).min(self.height / 2.0);
        let cx = px.clamp(self.x + r, self.x + self.width - r);
        let cy = py.clamp(self.y + r, self.y + self.height - r);
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r * r
    }
}

/// Result of stamping a canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampedBadge {
    pub text: &'static str,
    pub geometry: BadgeGeometry,
}

/// Draws the badge onto canvases
pub struct BadgeStamp {
    font: FontArc,
}

impl BadgeStamp {
    /// Stamp using the bundled sans-serif font
    pub fn new() -> Result<Self> {
        let font = FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|e| CompositeError::Font(format!("bundled font: {}", e)))?;
        Ok(Self { font })
    }

    /// Stamp using a TrueType/OpenType font file
    pub fn with_font_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let font = FontArc::try_from_vec(data)
            .map_err(|e| CompositeError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self { font })
    }

    pub fn text(&self) -> &'static str {
        BADGE_TEXT
    }

    /// Draw the badge in place
    pub fn apply(&self, canvas: &mut RgbaImage) -> StampedBadge {
        let geometry = BadgeGeometry::for_canvas(canvas.width(), canvas.height());
        fill_rounded(canvas, &geometry);
        draw_text(canvas, &geometry, &self.font, BADGE_TEXT);

        StampedBadge {
            text: BADGE_TEXT,
            geometry,
        }
    }
}

fn fill_rounded(canvas: &mut RgbaImage, g: &BadgeGeometry) {
    let x0 = g.x.floor().max(0.0) as u32;
    let y0 = g.y.floor().max(0.0) as u32;
    let x1 = ((g.x + g.width).ceil() as u32).min(canvas.width());
    let y1 = ((g.y + g.height).ceil() as u32).min(canvas.height());
    let keep = 1.0 - BADGE_OPACITY;

    for y in y0..y1 {
        for x in x0..x1 {
            if !g.contains(x as f32 + 0.5, y as f32 + 0.5) {
                continue;
            }
            let px = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                px[c] = (px[c] as f32 * keep).round() as u8;
            }
            // Composite over an opaque result, as a canvas fill would
            px[3] = (px[3] as f32 + (255.0 - px[3] as f32) * BADGE_OPACITY).round() as u8;
        }
    }
}

fn draw_text(canvas: &mut RgbaImage, g: &BadgeGeometry, font: &FontArc, text: &str) {
    let scale = PxScale::from(g.font_size);
    let (text_w, text_h) = imageproc::drawing::text_size(scale, font, text);
    let (cx, cy) = g.center();
    let x = (cx - text_w as f32 / 2.0).round() as i32;
    let y = (cy - text_h as f32 / 2.0).round() as i32;
    imageproc::drawing::draw_text_mut(canvas, TEXT_COLOR, x, y, scale, font, text);
}
