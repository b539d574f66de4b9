// compositor - raster operations behind try-on previews and exports
// Crop geometry, collage layouts and the provenance badge

pub mod badge;
pub mod collage;
pub mod crop;
pub mod error;

pub use badge::{BadgeGeometry, BadgeStamp, StampedBadge, BADGE_TEXT};
pub use collage::{
    compose_collage, Collage, CollageTemplate, Panel, COLLAGE_BACKGROUND, COLLAGE_GAP, COLLAGE_SIZE,
};
pub use crop::{crop_image, crop_to_png, CropSelection, PixelRect, SourceRect};
pub use error::{CompositeError, Result};

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

/// Decode an encoded image (format sniffed from the bytes)
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Encode a canvas as PNG
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    canvas.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Copy a single image onto a canvas of its natural size and stamp it
pub fn render_single(image: &DynamicImage, stamp: &BadgeStamp) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    stamp.apply(&mut canvas);
    canvas
}

/// Compose a collage and stamp it
pub fn render_collage(
    template: CollageTemplate,
    images: &[DynamicImage],
    stamp: &BadgeStamp,
) -> Result<Collage> {
    let mut collage = compose_collage(template, images)?;
    stamp.apply(&mut collage.canvas);
    Ok(collage)
}
