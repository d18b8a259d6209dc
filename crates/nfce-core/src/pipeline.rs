//! Complete receipt pipeline: image bytes in, consolidated items out.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, ScanError};
use crate::invoice::{
    build_client, consolidate, Extraction, ExtractionWarning, HttpInvoiceFetcher, InvoiceFetcher,
    TableExtractor,
};
use crate::models::config::{DecoderStrategy, HttpConfig, NfceConfig};
use crate::models::item::ConsolidatedItem;
use crate::qr::{crop, DecodeInput, LocalDecoder, PixelImage, QrLocator, SymbolDecoder};

/// Default margin kept around a located symbol.
pub const DEFAULT_PADDING: u32 = 20;

/// Output of the acquisition stages.
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// Text decoded from the symbol, used as the invoice URL.
    pub url: String,
    /// The cropped region, for decoders that work on the crop.
    pub crop: Option<PixelImage>,
}

/// Result of a complete scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// URL decoded from the QR code.
    pub source_url: String,
    /// Consolidated items in first-appearance order.
    pub items: Vec<ConsolidatedItem>,
    /// Numeric fragments that did not parse.
    pub warnings: Vec<ExtractionWarning>,
    /// Item rows found before consolidation.
    pub row_count: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Receipt pipeline combining location, decoding, fetching, and extraction.
pub struct ReceiptPipeline {
    locator: QrLocator,
    decoder: Box<dyn SymbolDecoder>,
    fetcher: Box<dyn InvoiceFetcher>,
    extractor: TableExtractor,
    padding: u32,
}

/// Builder for ReceiptPipeline.
pub struct ReceiptPipelineBuilder {
    decoder: Option<Box<dyn SymbolDecoder>>,
    fetcher: Option<Box<dyn InvoiceFetcher>>,
    padding: u32,
}

impl ReceiptPipelineBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            decoder: None,
            fetcher: None,
            padding: DEFAULT_PADDING,
        }
    }

    /// Set the symbol decoder.
    pub fn with_decoder(mut self, decoder: impl SymbolDecoder + 'static) -> Self {
        self.decoder = Some(Box::new(decoder));
        self
    }

    /// Set the invoice fetcher.
    pub fn with_fetcher(mut self, fetcher: impl InvoiceFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Set the crop padding.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Build the pipeline. Missing parts fall back to the local decoder and
    /// a default HTTP fetcher.
    pub fn build(self) -> Result<ReceiptPipeline> {
        let decoder = self
            .decoder
            .unwrap_or_else(|| Box::new(LocalDecoder::new()));

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(
                HttpInvoiceFetcher::from_config(&HttpConfig::default())
                    .map_err(|e| ScanError::Config(format!("failed to build HTTP client: {}", e)))?,
            ),
        };

        Ok(ReceiptPipeline {
            locator: QrLocator::new(),
            decoder,
            fetcher,
            extractor: TableExtractor::new(),
            padding: self.padding,
        })
    }
}

impl Default for ReceiptPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptPipeline {
    /// Create a new builder.
    pub fn builder() -> ReceiptPipelineBuilder {
        ReceiptPipelineBuilder::new()
    }

    /// Build the pipeline a configuration describes.
    ///
    /// The decoder and the fetcher share one HTTP client.
    pub fn from_config(config: &NfceConfig) -> Result<Self> {
        let client = build_client(&config.http)
            .map_err(|e| ScanError::Config(format!("failed to build HTTP client: {}", e)))?;

        let builder = Self::builder()
            .with_fetcher(HttpInvoiceFetcher::new(client.clone()))
            .with_padding(config.crop.padding);

        let builder = match config.decoder.strategy {
            DecoderStrategy::Local => builder.with_decoder(LocalDecoder::new()),
            #[cfg(feature = "remote")]
            DecoderStrategy::Remote => {
                builder.with_decoder(crate::qr::RemoteDecoder::new(client, &config.decoder))
            }
            #[cfg(not(feature = "remote"))]
            DecoderStrategy::Remote => {
                return Err(ScanError::Config(
                    "remote decoding requires the `remote` feature".to_string(),
                ));
            }
        };

        builder.build()
    }

    /// Name of the active decoding strategy.
    pub fn decoder_name(&self) -> &'static str {
        self.decoder.name()
    }

    /// Locate the symbol in `bytes` and cut it out with padding.
    pub fn locate_and_crop(&self, bytes: &[u8]) -> Result<PixelImage> {
        locate_and_crop(self.locator, self.padding, bytes)
    }

    /// Run the acquisition stages: locate, crop, and decode.
    ///
    /// Loading, locating, and cropping run on the blocking pool so other runs
    /// on the same task keep making progress.
    pub async fn acquire(&self, bytes: &[u8]) -> Result<Acquisition> {
        let acquisition = match self.decoder.input() {
            DecodeInput::Cropped => {
                let (locator, padding, owned) = (self.locator, self.padding, bytes.to_vec());
                let (cropped, png) = tokio::task::spawn_blocking(move || {
                    let cropped = locate_and_crop(locator, padding, &owned)?;
                    let png = cropped.to_png().map_err(ScanError::Encode)?;
                    Ok::<_, ScanError>((cropped, png))
                })
                .await??;

                let url = self.decoder.decode(&png).await?;
                Acquisition {
                    url,
                    crop: Some(cropped),
                }
            }
            DecodeInput::Original => {
                image::guess_format(bytes)?;
                let url = self.decoder.decode(bytes).await?;
                Acquisition { url, crop: None }
            }
        };

        info!("QR decoded with {} decoder: {}", self.decoder.name(), acquisition.url);
        Ok(acquisition)
    }

    /// Retrieve the invoice page behind a decoded URL.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.fetcher.fetch(url).await.map_err(|source| ScanError::Fetch {
            url: url.to_string(),
            source,
        })
    }

    /// Read the item rows of an invoice page.
    pub fn extract(&self, html: &str) -> Extraction {
        self.extractor.extract(html)
    }

    /// Consolidate an extraction into the final report.
    pub fn finish(&self, source_url: String, extraction: Extraction, started: Instant) -> ScanReport {
        let items = consolidate(&extraction.items);
        let processing_time_ms = started.elapsed().as_millis() as u64;

        debug!(
            "{} rows -> {} items in {}ms",
            extraction.items.len(),
            items.len(),
            processing_time_ms
        );

        ScanReport {
            source_url,
            row_count: extraction.items.len(),
            items,
            warnings: extraction.warnings,
            processing_time_ms,
        }
    }

    /// Scan one receipt photograph.
    pub async fn scan(&self, bytes: &[u8]) -> Result<ScanReport> {
        let started = Instant::now();

        let acquisition = self.acquire(bytes).await?;
        let html = self.fetch(&acquisition.url).await?;
        let extraction = self.extract(&html);

        let report = self.finish(acquisition.url, extraction, started);
        info!(
            "Scan complete: {} items from {} rows in {}ms",
            report.items.len(),
            report.row_count,
            report.processing_time_ms
        );
        Ok(report)
    }

    /// Scan one receipt photograph, returning only the items.
    pub async fn run(&self, bytes: &[u8]) -> Result<Vec<ConsolidatedItem>> {
        Ok(self.scan(bytes).await?.items)
    }
}

fn locate_and_crop(locator: QrLocator, padding: u32, bytes: &[u8]) -> Result<PixelImage> {
    let image = PixelImage::from_bytes(bytes)?;
    info!("Locating QR code in {}x{} image", image.width(), image.height());

    let quad = locator.locate(&image).ok_or(ScanError::QrNotFound)?;
    crop(&image, &quad, padding)
}
