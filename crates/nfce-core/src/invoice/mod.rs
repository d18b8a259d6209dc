//! Invoice page retrieval, item extraction, and consolidation.

mod consolidate;
mod extractor;
mod fetcher;
pub mod normalize;
pub mod patterns;

pub use consolidate::consolidate;
pub use extractor::{first_table_html, Extraction, ExtractionWarning, NumericField, TableExtractor};
pub use fetcher::{build_client, HttpInvoiceFetcher, InvoiceFetcher};
