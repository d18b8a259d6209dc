//! QR decoding delegated to an HTTP decoding service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::DecodeError;
use crate::models::config::DecoderConfig;

use super::decoder::{DecodeInput, SymbolDecoder};

/// One entry of the service response; one per uploaded file.
#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    symbol: Vec<Symbol>,
}

#[derive(Debug, Deserialize)]
struct Symbol {
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Uploads the whole photograph to a decoding service.
#[derive(Debug, Clone)]
pub struct RemoteDecoder {
    client: Client,
    endpoint: String,
    field: String,
    filename: String,
}

impl RemoteDecoder {
    pub fn new(client: Client, config: &DecoderConfig) -> Self {
        Self {
            client,
            endpoint: config.remote_endpoint.clone(),
            field: config.remote_field.clone(),
            filename: config.remote_filename.clone(),
        }
    }
}

#[async_trait]
impl SymbolDecoder for RemoteDecoder {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn input(&self) -> DecodeInput {
        DecodeInput::Original
    }

    async fn decode(&self, image: &[u8]) -> Result<String, DecodeError> {
        let mime = image::guess_format(image)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");

        let part = Part::bytes(image.to_vec())
            .file_name(self.filename.clone())
            .mime_str(mime)?;
        let form = Form::new().part(self.field.clone(), part);

        info!("Sending {} bytes to decoding service {}", image.len(), self.endpoint);

        let results: Vec<ReadResult> = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Decoding service returned {} results", results.len());
        symbol_data(results)
    }
}

/// Data of the first symbol of the first result.
fn symbol_data(results: Vec<ReadResult>) -> Result<String, DecodeError> {
    let symbol = results
        .into_iter()
        .next()
        .and_then(|result| result.symbol.into_iter().next());

    match symbol {
        Some(Symbol {
            data: Some(data), ..
        }) if !data.is_empty() => Ok(data),
        Some(Symbol { error, .. }) => Err(DecodeError::Empty(error)),
        None => Err(DecodeError::Empty(None)),
    }
}
