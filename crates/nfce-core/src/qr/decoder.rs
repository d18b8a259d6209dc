//! Common contract of the symbol decoding strategies.

use async_trait::async_trait;

use crate::error::DecodeError;

/// Which image a decoder wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeInput {
    /// The located symbol, cropped with padding and PNG encoded.
    Cropped,
    /// The image exactly as supplied by the caller.
    Original,
}

/// Trait for QR symbol decoders.
///
/// Implementations return the single payload encoded in the symbol. The
/// pipeline treats it as the invoice URL without further validation.
#[async_trait]
pub trait SymbolDecoder: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Image the pipeline must hand to [`SymbolDecoder::decode`].
    fn input(&self) -> DecodeInput;

    /// Decode encoded image bytes into the symbol's text.
    async fn decode(&self, image: &[u8]) -> Result<String, DecodeError>;
}
