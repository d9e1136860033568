//! Error types for the ncdns webhook
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for ncdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ncdns webhook
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed FQDN or domain filter
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Endpoint outside the configured domain filter
    #[error("Domain mismatch: {fqdn} is not within {filter}")]
    DomainMismatch {
        /// The offending name
        fqdn: String,
        /// The configured domain filter
        filter: String,
    },

    /// Registrar call failed or returned a non-success envelope
    #[error("Registrar error: {}", .messages.join("; "))]
    Registrar {
        /// Messages reported by the registrar, verbatim
        messages: Vec<String>,
    },

    /// Invalid input from the control plane
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client IP discovery errors
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid domain error
    pub fn invalid_domain(msg: impl Into<String>) -> Self {
        Self::InvalidDomain(msg.into())
    }

    /// Create a domain mismatch error
    pub fn domain_mismatch(fqdn: impl Into<String>, filter: impl Into<String>) -> Self {
        Self::DomainMismatch {
            fqdn: fqdn.into(),
            filter: filter.into(),
        }
    }

    /// Create a registrar error from a single message
    pub fn registrar(msg: impl Into<String>) -> Self {
        Self::Registrar {
            messages: vec![msg.into()],
        }
    }

    /// Create a registrar error carrying every upstream message
    pub fn registrar_messages(messages: Vec<String>) -> Self {
        Self::Registrar { messages }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Whether the error was caused by the caller's request rather than
    /// by this process or the registrar
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDomain(_)
                | Self::DomainMismatch { .. }
                | Self::InvalidInput(_)
                | Self::Json(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrar_error_joins_upstream_messages() {
        let err = Error::registrar_messages(vec![
            "Domain not found".to_string(),
            "Invalid client IP".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Registrar error: Domain not found; Invalid client IP"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(Error::invalid_domain("com").is_client_error());
        assert!(Error::domain_mismatch("a.other.org", "example.com").is_client_error());
        assert!(Error::invalid_input("no filter").is_client_error());
        assert!(!Error::registrar("timeout").is_client_error());
        assert!(!Error::config("missing key").is_client_error());
    }
}
