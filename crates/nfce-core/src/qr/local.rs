//! In-process QR decoding with `rqrr`.

use async_trait::async_trait;
use rqrr::PreparedImage;
use tracing::{debug, info};

use crate::error::DecodeError;

use super::decoder::{DecodeInput, SymbolDecoder};

/// Decodes the cropped symbol region locally.
///
/// Full-resolution phone photos are often rejected; the pipeline hands this
/// decoder the padded crop instead. Detection runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDecoder;

impl LocalDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SymbolDecoder for LocalDecoder {
    fn name(&self) -> &'static str {
        "local"
    }

    fn input(&self) -> DecodeInput {
        DecodeInput::Cropped
    }

    async fn decode(&self, image: &[u8]) -> Result<String, DecodeError> {
        let image = image.to_vec();
        let content = tokio::task::spawn_blocking(move || decode_symbol(&image)).await??;

        info!("Decoded QR payload ({} chars)", content.len());
        Ok(content)
    }
}

/// Detect and decode the first symbol in an encoded image.
fn decode_symbol(image: &[u8]) -> Result<String, DecodeError> {
    let luma = image::load_from_memory(image)?.to_luma8();
    let (width, height) = luma.dimensions();

    let mut prepared = PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| luma.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    debug!("Local decoder found {} grids in {}x{}", grids.len(), width, height);

    let grid = grids.first().ok_or(DecodeError::NoSymbol)?;
    let (_meta, content) = grid
        .decode()
        .map_err(|e| DecodeError::Local(e.to_string()))?;

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::PixelImage;
    use image::{Rgba, RgbaImage};

    #[tokio::test]
    async fn test_blank_crop_has_no_symbol() {
        let blank = PixelImage::from_rgba(RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255])));
        let png = blank.to_png().unwrap();

        let err = LocalDecoder::new().decode(&png).await.unwrap_err();
        assert!(matches!(err, DecodeError::NoSymbol));
    }

    #[tokio::test]
    async fn test_unreadable_bytes() {
        let err = LocalDecoder::new().decode(b"\x00\x01\x02").await.unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }

    #[tokio::test]
    async fn test_decodes_rendered_symbol() {
        let url = "https://www.sefaz.rs.gov.br/NFCE/NFCE-COM.aspx?p=4324";
        let symbol = qrcode::QrCode::new(url.as_bytes())
            .unwrap()
            .render::<image::Luma<u8>>()
            .module_dimensions(4, 4)
            .build();
        let png = PixelImage::from_dynamic(&image::DynamicImage::ImageLuma8(symbol))
            .to_png()
            .unwrap();

        assert_eq!(LocalDecoder::new().decode(&png).await.unwrap(), url);
    }

    #[test]
    fn test_wants_cropped_input() {
        assert_eq!(LocalDecoder::new().input(), DecodeInput::Cropped);
    }
}
