//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use nfce_core::{DecoderStrategy, NfceConfig, ScanError};

/// Decoding strategy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecoderArg {
    /// Locate, crop, and decode in-process
    Local,
    /// Upload the photo to the decoding service
    Remote,
}

impl From<DecoderArg> for DecoderStrategy {
    fn from(arg: DecoderArg) -> Self {
        match arg {
            DecoderArg::Local => DecoderStrategy::Local,
            DecoderArg::Remote => DecoderStrategy::Remote,
        }
    }
}

/// Image extensions accepted as receipt photographs.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nfce")
        .join("config.json")
}

/// Config path in effect: `--config` when given, the default otherwise.
pub fn config_path(override_path: Option<&str>) -> PathBuf {
    override_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration from `--config`, the default file, or defaults.
pub fn load_config(override_path: Option<&str>) -> anyhow::Result<NfceConfig> {
    if let Some(path) = override_path {
        return Ok(NfceConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        Ok(NfceConfig::from_file(&path)?)
    } else {
        Ok(NfceConfig::default())
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Attach the failing stage to a scan error.
pub fn stage_error(err: ScanError) -> anyhow::Error {
    let stage = err.stage();
    anyhow::Error::new(err).context(format!("{} stage failed", stage))
}
