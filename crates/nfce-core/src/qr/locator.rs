//! QR symbol location in raster images.

use rqrr::PreparedImage;
use tracing::debug;

use super::{BoundingQuad, PixelImage, Point};

/// Finds the QR symbol in a photograph.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrLocator;

impl QrLocator {
    pub fn new() -> Self {
        Self
    }

    /// Corners of the first symbol found, or `None` when there is none.
    ///
    /// Corners are clamped to the image so downstream geometry never starts
    /// outside the source.
    pub fn locate(&self, image: &PixelImage) -> Option<BoundingQuad> {
        let luma = image.luma();
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let mut prepared = PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| luma.get_pixel(x as u32, y as u32)[0],
        );
        let grids = prepared.detect_grids();
        debug!("Detected {} QR candidates in {}x{}", grids.len(), width, height);

        let grid = grids.first()?;
        let max_x = (width - 1) as f32;
        let max_y = (height - 1) as f32;
        let corners: [Point; 4] = std::array::from_fn(|i| {
            let p = &grid.bounds[i];
            Point::new((p.x as f32).clamp(0.0, max_x), (p.y as f32).clamp(0.0, max_y))
        });

        let quad = BoundingQuad::new(corners);
        debug!(
            "QR located: top-left {:?}, bottom-right {:?}",
            quad.top_left(),
            quad.bottom_right()
        );

        Some(quad)
    }
}
