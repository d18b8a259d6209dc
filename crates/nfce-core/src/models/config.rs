//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};

/// Default decoding service endpoint.
pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://api.qrserver.com/v1/read-qr-code/";

/// Main configuration for the nfce pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfceConfig {
    /// Symbol decoder configuration.
    pub decoder: DecoderConfig,

    /// Region cropping configuration.
    pub crop: CropConfig,

    /// HTTP client configuration.
    pub http: HttpConfig,
}

/// Which decoding strategy a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderStrategy {
    /// Locate, crop, and decode in-process.
    #[default]
    Local,
    /// Send the whole image to a decoding service.
    Remote,
}

impl std::fmt::Display for DecoderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecoderStrategy::Local => write!(f, "local"),
            DecoderStrategy::Remote => write!(f, "remote"),
        }
    }
}

/// Symbol decoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Active decoding strategy.
    pub strategy: DecoderStrategy,

    /// Endpoint of the decoding service (remote strategy only).
    pub remote_endpoint: String,

    /// Multipart field name carrying the image.
    pub remote_field: String,

    /// File name reported for the uploaded image.
    pub remote_filename: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strategy: DecoderStrategy::Local,
            remote_endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            remote_field: "file".to_string(),
            remote_filename: "qrcode.png".to_string(),
        }
    }
}

/// Region cropping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Margin in pixels kept around the located symbol.
    pub padding: u32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self { padding: 20 }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Whole-request timeout in seconds. `None` leaves the client default.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("nfce/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

impl NfceConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NfceConfig::default();
        assert_eq!(config.decoder.strategy, DecoderStrategy::Local);
        assert_eq!(config.decoder.remote_endpoint, DEFAULT_REMOTE_ENDPOINT);
        assert_eq!(config.crop.padding, 20);
        assert!(config.http.timeout_secs.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: NfceConfig =
            serde_json::from_str(r#"{"decoder": {"strategy": "remote"}}"#).unwrap();
        assert_eq!(config.decoder.strategy, DecoderStrategy::Remote);
        assert_eq!(config.decoder.remote_field, "file");
        assert_eq!(config.crop.padding, 20);
    }
}
