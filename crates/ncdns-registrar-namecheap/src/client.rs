//! Namecheap XML API client
//!
//! One method, [`NamecheapClient::invoke`], sends a command with the
//! authentication parameters every call needs and unwraps the response
//! envelope. The client is single-shot: no retries, no caching.

use crate::envelope::{ApiResponse, CommandResponse};
use ncdns_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;

/// Production API endpoint
pub const NAMECHEAP_API_URL: &str = "https://api.namecheap.com/xml.response";

/// Sandbox API endpoint
pub const NAMECHEAP_SANDBOX_API_URL: &str = "https://api.sandbox.namecheap.com/xml.response";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials sent with every call
#[derive(Clone)]
pub struct Credentials {
    /// `ApiUser`
    pub api_user: String,
    /// `ApiKey`
    /// ⚠️ NEVER log this value
    pub api_key: String,
    /// `UserName`
    pub username: String,
    /// `ClientIp`, must be whitelisted on the account
    pub client_ip: IpAddr,
}

/// HTTP client for the Namecheap XML API
///
/// # Security
///
/// The Debug implementation does NOT expose the API key, and transport
/// errors are stripped of the request URL, which carries the key as a
/// query parameter.
#[derive(Clone)]
pub struct NamecheapClient {
    credentials: Credentials,
    endpoint: String,
    http: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for NamecheapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamecheapClient")
            .field("api_user", &self.credentials.api_user)
            .field("api_key", &"<REDACTED>")
            .field("username", &self.credentials.username)
            .field("client_ip", &self.credentials.client_ip)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl NamecheapClient {
    /// Create a client for the production or sandbox endpoint
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the API key is empty or the HTTP client cannot
    ///   be built
    pub fn new(credentials: Credentials, sandbox: bool) -> Result<Self> {
        if credentials.api_key.is_empty() {
            return Err(Error::config("Namecheap API key cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = if sandbox {
            NAMECHEAP_SANDBOX_API_URL
        } else {
            NAMECHEAP_API_URL
        };

        Ok(Self {
            credentials,
            endpoint: endpoint.to_string(),
            http,
        })
    }

    /// Point the client at another endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The endpoint calls are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke a command and return its payload
    ///
    /// # Parameters
    ///
    /// - `command`: e.g. `namecheap.domains.dns.getHosts`
    /// - `params`: command parameters, appended after the credentials
    ///
    /// # Errors
    ///
    /// Every failure is [`Error::Registrar`]: transport errors, non-2xx
    /// statuses, undecodable bodies, and `Status="ERROR"` envelopes (with
    /// the registrar's messages verbatim).
    pub async fn invoke(&self, command: &str, params: &[(String, String)]) -> Result<CommandResponse> {
        let client_ip = self.credentials.client_ip.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("ApiUser", self.credentials.api_user.as_str()),
            ("ApiKey", self.credentials.api_key.as_str()),
            ("UserName", self.credentials.username.as_str()),
            ("ClientIp", client_ip.as_str()),
            ("Command", command),
        ];
        query.extend(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        tracing::debug!("Invoking {} with {} parameter(s)", command, params.len());

        let response = self
            .http
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::registrar(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::registrar(format!("Failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(Error::registrar(format!(
                "{} returned HTTP {}: {}",
                command,
                status,
                body.trim()
            )));
        }

        ApiResponse::parse(&body)?.into_result().inspect_err(|e| {
            tracing::warn!("{} failed: {}", command, e);
        })
    }
}
