//! Core library for Brazilian NFC-e receipt processing.
//!
//! This crate provides:
//! - QR acquisition from receipt photographs (locate, crop, decode)
//! - Local (`rqrr`) and remote (decoding service) decoding strategies
//! - Invoice page retrieval and item table extraction
//! - Consolidation of duplicate item rows with Brazilian number formatting

pub mod error;
pub mod invoice;
pub mod models;
pub mod pipeline;
pub mod qr;

pub use error::{DecodeError, FetchError, Result, ScanError, Stage};
pub use invoice::{
    consolidate, first_table_html, Extraction, ExtractionWarning, HttpInvoiceFetcher,
    InvoiceFetcher, TableExtractor,
};
pub use models::config::{DecoderStrategy, NfceConfig};
pub use models::item::{ConsolidatedItem, RawItem};
pub use pipeline::{Acquisition, ReceiptPipeline, ReceiptPipelineBuilder, ScanReport};
pub use qr::{
    crop, crop_rect, BoundingQuad, CropRect, DecodeInput, LocalDecoder, PixelImage, Point,
    QrLocator, SymbolDecoder,
};

#[cfg(feature = "remote")]
pub use qr::RemoteDecoder;
