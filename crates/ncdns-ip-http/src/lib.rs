// # HTTP IP Source
//
// This crate discovers the webhook host's public IP by asking an external
// "what is my IP" service.
//
// ## Purpose
//
// The registrar only accepts calls from whitelisted client IPs and wants
// that IP repeated on every request. When `NAMECHEAP_CLIENT_IP` is not
// set, the daemon resolves it once at startup through this source.
//
// ## Architecture
//
// One GET per call, plain-text body, bounded by a short timeout. No
// caching and no background polling: the result is resolved once and
// passed into the registrar configuration.

use ncdns_core::traits::IpSource;
use ncdns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default discovery service; returns the caller's IP as plain text
pub const DEFAULT_IP_DISCOVERY_URL: &str = "https://api.ipify.org";

/// Default discovery timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// Request timeout
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            timeout,
            client,
        })
    }

    /// The discovery URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Discovering public IP via {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let ip_text = ip_text.trim();

        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| Error::ip_source(format!("Invalid IP address: {}", ip_text)))?;

        tracing::info!("Discovered public IP {}", ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
