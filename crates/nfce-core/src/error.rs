//! Error types for the nfce-core library.

use std::fmt;

use thiserror::Error;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building the pipeline from configuration.
    Setup,
    /// Reading the input image.
    Load,
    /// Searching the image for a QR symbol.
    Locate,
    /// Cutting the located region out of the image.
    Crop,
    /// Turning the symbol into text.
    Decode,
    /// Retrieving the invoice page.
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Load => "load",
            Stage::Locate => "locate",
            Stage::Crop => "crop",
            Stage::Decode => "decode",
            Stage::Fetch => "fetch",
        };
        f.write_str(name)
    }
}

/// Main error type for a receipt scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input bytes are not a readable image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// No QR symbol was found in the image.
    #[error("no QR code detected")]
    QrNotFound,

    /// The crop rectangle degenerated to a non-positive size.
    #[error("invalid crop geometry: {width}x{height}")]
    Geometry { width: i64, height: i64 },

    /// The cropped region could not be re-encoded for decoding.
    #[error("failed to encode cropped region: {0}")]
    Encode(#[source] image::ImageError),

    /// The symbol could not be turned into text.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The decoded invoice URL could not be retrieved.
    #[error("failed to fetch invoice from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The blocking task running location and cropping did not finish.
    #[error("image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ScanError {
    /// Stage the error aborted the run in.
    pub fn stage(&self) -> Stage {
        match self {
            ScanError::Config(_) => Stage::Setup,
            ScanError::Image(_) => Stage::Load,
            ScanError::QrNotFound | ScanError::Worker(_) => Stage::Locate,
            ScanError::Geometry { .. } | ScanError::Encode(_) => Stage::Crop,
            ScanError::Decode(_) => Stage::Decode,
            ScanError::Fetch { .. } => Stage::Fetch,
        }
    }

    /// Decoded URL, when the run got far enough to have one.
    pub fn url(&self) -> Option<&str> {
        match self {
            ScanError::Fetch { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Errors raised by a symbol decoder.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The decoder found no symbol in the image it was given.
    #[error("no QR symbol found in image")]
    NoSymbol,

    /// The local decoder rejected the symbol.
    #[error("local decoder failed: {0}")]
    Local(String),

    /// The blocking decode task did not finish.
    #[error("decoder worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// The image handed to the decoder could not be read.
    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),

    /// The request to the decoding service failed.
    #[error("decoding service request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The decoding service answered without symbol data.
    #[error(
        "decoding service returned no symbol data: {}",
        .0.as_deref().unwrap_or("empty response")
    )]
    Empty(Option<String>),
}

/// Errors raised while retrieving the invoice page.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server responded with status {0}")]
    Status(u16),
}

/// Result type for the nfce library.
pub type Result<T> = std::result::Result<T, ScanError>;
