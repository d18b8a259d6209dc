//! Padded, bounds-safe cropping around a located symbol.

use serde::Serialize;
use tracing::debug;

use crate::error::ScanError;

use super::{BoundingQuad, PixelImage};

/// Crop rectangle inside a source image.
///
/// Always satisfies `left + width <= source width` and
/// `top + height <= source height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the crop rectangle for `quad` grown by `padding` on every side.
///
/// The origin is clamped at zero and the size is clamped to the space left
/// in the source, so padding shrinks near the edges instead of overflowing.
pub fn crop_rect(
    source_width: u32,
    source_height: u32,
    quad: &BoundingQuad,
    padding: u32,
) -> Result<CropRect, ScanError> {
    let top_left = quad.top_left();
    let bottom_right = quad.bottom_right();
    let padding = f64::from(padding);

    let left = (f64::from(top_left.x) - padding).round().max(0.0) as i64;
    let top = (f64::from(top_left.y) - padding).round().max(0.0) as i64;

    let wanted_width = (f64::from(bottom_right.x - top_left.x) + 2.0 * padding).round() as i64;
    let wanted_height = (f64::from(bottom_right.y - top_left.y) + 2.0 * padding).round() as i64;

    let width = (i64::from(source_width) - left).min(wanted_width);
    let height = (i64::from(source_height) - top).min(wanted_height);

    if width <= 0 || height <= 0 {
        return Err(ScanError::Geometry { width, height });
    }

    // width > 0 implies left < source_width, so every value fits in u32.
    Ok(CropRect {
        left: left as u32,
        top: top as u32,
        width: width as u32,
        height: height as u32,
    })
}

/// Cut the padded symbol region out of `image`.
pub fn crop(image: &PixelImage, quad: &BoundingQuad, padding: u32) -> Result<PixelImage, ScanError> {
    let rect = crop_rect(image.width(), image.height(), quad, padding)?;

    debug!(
        "Cropping {}x{} at ({}, {}) from {}x{}",
        rect.width,
        rect.height,
        rect.left,
        rect.top,
        image.width(),
        image.height()
    );

    let region = image::imageops::crop_imm(image.as_rgba(), rect.left, rect.top, rect.width, rect.height)
        .to_image();

    Ok(PixelImage::from_rgba(region))
}
