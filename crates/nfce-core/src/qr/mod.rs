//! QR acquisition: locating, cropping, and decoding the receipt symbol.

mod crop;
mod decoder;
mod local;
mod locator;
#[cfg(feature = "remote")]
mod remote;

pub use crop::{crop, crop_rect, CropRect};
pub use decoder::{DecodeInput, SymbolDecoder};
pub use local::LocalDecoder;
pub use locator::QrLocator;
#[cfg(feature = "remote")]
pub use remote::RemoteDecoder;

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

/// An RGBA8 raster image.
#[derive(Debug, Clone)]
pub struct PixelImage {
    pixels: RgbaImage,
}

impl PixelImage {
    /// Decode JPEG/PNG (or any format `image` reads) bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        Ok(Self::from_dynamic(&image::load_from_memory(bytes)?))
    }

    /// Convert any decoded image, adding an alpha channel when missing.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            pixels: image.to_rgba8(),
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Greyscale copy for symbol detection.
    pub fn luma(&self) -> GrayImage {
        image::imageops::grayscale(&self.pixels)
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }

    /// Save to disk, format chosen from the extension.
    ///
    /// The alpha channel is dropped so that JPEG targets work.
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        DynamicImage::ImageRgba8(self.pixels.clone())
            .to_rgb8()
            .save(path)
    }
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Corners of a located symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingQuad {
    /// Corners in detection order.
    pub corners: [Point; 4],
}

impl BoundingQuad {
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned quad spanning `top_left` to `bottom_right`.
    pub fn from_rect(top_left: Point, bottom_right: Point) -> Self {
        Self::new([
            top_left,
            Point::new(bottom_right.x, top_left.y),
            bottom_right,
            Point::new(top_left.x, bottom_right.y),
        ])
    }

    /// Upper-left corner of the corners' envelope.
    ///
    /// Using the envelope keeps a rotated symbol fully inside the crop.
    pub fn top_left(&self) -> Point {
        let x = self.corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let y = self.corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        Point::new(x, y)
    }

    /// Lower-right corner of the corners' envelope.
    pub fn bottom_right(&self) -> Point {
        let x = self
            .corners
            .iter()
            .map(|p| p.x)
            .fold(f32::NEG_INFINITY, f32::max);
        let y = self
            .corners
            .iter()
            .map(|p| p.y)
            .fold(f32::NEG_INFINITY, f32::max);
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_envelope_of_rotated_quad() {
        // Diamond: symbol turned 45 degrees.
        let quad = BoundingQuad::new([
            Point::new(50.0, 10.0),
            Point::new(90.0, 50.0),
            Point::new(50.0, 90.0),
            Point::new(10.0, 50.0),
        ]);

        assert_eq!(quad.top_left(), Point::new(10.0, 10.0));
        assert_eq!(quad.bottom_right(), Point::new(90.0, 90.0));
    }

    #[test]
    fn test_from_bytes_adds_alpha() {
        let rgb = image::RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let mut png = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let image = PixelImage::from_bytes(&png).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.as_rgba().get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(PixelImage::from_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn test_png_round_trip_keeps_size() {
        let image = PixelImage::from_rgba(RgbaImage::new(7, 5));
        let decoded = PixelImage::from_bytes(&image.to_png().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }
}
