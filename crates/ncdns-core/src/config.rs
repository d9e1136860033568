//! Configuration types for the ncdns webhook
//!
//! This module defines all configuration structures used throughout the crate.

use crate::domain::DomainFilter;
use crate::record::DEFAULT_TTL;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Smallest TTL the registrar accepts
pub const MIN_TTL: u32 = 60;

/// Largest TTL the registrar accepts
pub const MAX_TTL: u32 = 60000;

/// Main webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Registrar configuration
    pub registrar: RegistrarConfig,

    /// The single registered domain to manage; `None` manages nothing
    #[serde(default)]
    pub domain_filter: Option<String>,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Reconciliation settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl WebhookConfig {
    /// Create a new configuration with defaults
    pub fn new(registrar: RegistrarConfig) -> Self {
        Self {
            registrar,
            domain_filter: None,
            server: ServerConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Set the domain filter
    pub fn with_domain_filter(mut self, filter: impl Into<String>) -> Self {
        self.domain_filter = Some(filter.into());
        self
    }

    /// Parse the configured domain filter
    pub fn parsed_domain_filter(&self) -> Result<Option<DomainFilter>, crate::Error> {
        DomainFilter::from_optional(self.domain_filter.as_deref())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.registrar.validate()?;
        self.parsed_domain_filter()
            .map_err(|e| crate::Error::config(format!("DOMAIN_FILTER: {}", e)))?;
        self.reconcile.validate()?;

        if self.server.port == 0 {
            return Err(crate::Error::config("Server port must be > 0"));
        }

        Ok(())
    }
}

/// Registrar configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrarConfig {
    /// Namecheap XML API
    Namecheap {
        /// API user
        api_user: String,
        /// API key
        api_key: String,
        /// Account user name (usually the API user)
        username: String,
        /// Whitelisted client IP sent with every call
        client_ip: Option<IpAddr>,
        /// Use the sandbox endpoint
        #[serde(default)]
        sandbox: bool,
        /// Fetch for real but only log replacements
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom registrar
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl RegistrarConfig {
    /// Validate the registrar configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistrarConfig::Namecheap {
                api_user,
                api_key,
                username,
                ..
            } => {
                if api_user.is_empty() {
                    return Err(crate::Error::config("Namecheap API user cannot be empty"));
                }
                if api_key.is_empty() {
                    return Err(crate::Error::config("Namecheap API key cannot be empty"));
                }
                if username.is_empty() {
                    return Err(crate::Error::config("Namecheap user name cannot be empty"));
                }
                Ok(())
            }
            RegistrarConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom registrar factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom registrar config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the registrar type name
    pub fn type_name(&self) -> &str {
        match self {
            RegistrarConfig::Namecheap { .. } => "namecheap",
            RegistrarConfig::Custom { factory, .. } => factory,
        }
    }

    /// Fill in the client IP resolved at startup
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        if let RegistrarConfig::Namecheap { client_ip, .. } = &mut self {
            *client_ip = Some(ip);
        }
        self
    }
}

// Keeps the API key out of logs
impl std::fmt::Debug for RegistrarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrarConfig::Namecheap {
                api_user,
                username,
                client_ip,
                sandbox,
                dry_run,
                ..
            } => f
                .debug_struct("Namecheap")
                .field("api_user", api_user)
                .field("api_key", &"<REDACTED>")
                .field("username", username)
                .field("client_ip", client_ip)
                .field("sandbox", sandbox)
                .field("dry_run", dry_run)
                .finish(),
            RegistrarConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", &"<REDACTED>")
                .finish(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Reconciliation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// TTL for endpoints that carry none (seconds)
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Skip creates that already exist as `(name, type, address)`
    ///
    /// Makes a re-sent create batch idempotent.
    #[serde(default = "default_dedupe_creates")]
    pub dedupe_creates: bool,
}

impl ReconcileConfig {
    /// Validate the reconciliation settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(MIN_TTL..=MAX_TTL).contains(&self.default_ttl) {
            return Err(crate::Error::config(format!(
                "Default TTL must be between {} and {} seconds. Got: {}",
                MIN_TTL, MAX_TTL, self.default_ttl
            )));
        }
        Ok(())
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_ttl(),
            dedupe_creates: default_dedupe_creates(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_dedupe_creates() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namecheap() -> RegistrarConfig {
        RegistrarConfig::Namecheap {
            api_user: "user".to_string(),
            api_key: "secret-key-123".to_string(),
            username: "user".to_string(),
            client_ip: None,
            sandbox: false,
            dry_run: false,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = WebhookConfig::new(namecheap()).with_domain_filter("example.com");
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.reconcile.default_ttl, 1800);
        assert!(config.reconcile.dedupe_creates);
    }

    #[test]
    fn rejects_three_label_filter() {
        let config = WebhookConfig::new(namecheap()).with_domain_filter("a.example.com");
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn rejects_empty_api_key() {
        let config = RegistrarConfig::Namecheap {
            api_user: "user".to_string(),
            api_key: String::new(),
            username: "user".to_string(),
            client_ip: None,
            sandbox: false,
            dry_run: false,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_ttl() {
        let mut config = WebhookConfig::new(namecheap());
        config.reconcile.default_ttl = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn client_ip_is_filled_in() {
        let config = namecheap().with_client_ip("203.0.113.7".parse().unwrap());
        match config {
            RegistrarConfig::Namecheap { client_ip, .. } => {
                assert_eq!(client_ip, Some("203.0.113.7".parse().unwrap()));
            }
            RegistrarConfig::Custom { .. } => unreachable!(),
        }
    }

    #[test]
    fn debug_hides_api_key() {
        let debug = format!("{:?}", namecheap());
        assert!(!debug.contains("secret-key-123"));
        assert!(debug.contains("<REDACTED>"));
    }

    #[test]
    fn deserializes_tagged_registrar() {
        let config: WebhookConfig = serde_json::from_value(serde_json::json!({
            "registrar": {
                "type": "namecheap",
                "api_user": "user",
                "api_key": "key",
                "username": "user",
                "client_ip": "198.51.100.1"
            },
            "domain_filter": "example.com"
        }))
        .unwrap();
        assert_eq!(config.registrar.type_name(), "namecheap");
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.validate().is_ok());
    }
}
