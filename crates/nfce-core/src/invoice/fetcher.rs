//! Retrieval of the invoice page a decoded QR code points to.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::config::HttpConfig;

/// Trait for invoice page sources.
#[async_trait]
pub trait InvoiceFetcher: Send + Sync {
    /// Retrieve the HTML document behind `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches invoice pages with a single plain GET.
#[derive(Debug, Clone)]
pub struct HttpInvoiceFetcher {
    client: Client,
}

impl HttpInvoiceFetcher {
    /// Create a fetcher around an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a fetcher with its own client built from configuration.
    pub fn from_config(config: &HttpConfig) -> Result<Self, FetchError> {
        Ok(Self::new(build_client(config)?))
    }
}

#[async_trait]
impl InvoiceFetcher for HttpInvoiceFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching invoice page: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        debug!("Invoice page: {} bytes", html.len());

        Ok(html)
    }
}

/// Build the HTTP client shared by the fetcher and the remote decoder.
pub fn build_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}
