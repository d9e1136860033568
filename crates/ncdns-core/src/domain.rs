//! Domain name parsing
//!
//! Maps fully-qualified names to the registrar's `(SLD, TLD, host)` triple
//! and back. The registrar addresses the zone apex with the `@` host.

use crate::error::{Error, Result};
use std::fmt;

/// Host label the registrar uses for the zone apex
pub const APEX_HOST: &str = "@";

/// Strip a trailing root-zone dot and lowercase the name
pub fn normalize_fqdn(fqdn: &str) -> String {
    fqdn.strip_suffix('.').unwrap_or(fqdn).to_ascii_lowercase()
}

/// A fully-qualified name split into registrar coordinates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainParts {
    /// Second-level label (e.g. `example`)
    pub sld: String,
    /// Top-level label (e.g. `com`)
    pub tld: String,
    /// Host label, or `@` for the apex
    pub host: String,
}

impl DomainParts {
    /// The registered domain, `{sld}.{tld}`
    pub fn domain(&self) -> String {
        format!("{}.{}", self.sld, self.tld)
    }

    /// Rebuild the FQDN; exact inverse of [`parse_fqdn`]
    pub fn fqdn(&self) -> String {
        if self.host == APEX_HOST {
            self.domain()
        } else {
            format!("{}.{}.{}", self.host, self.sld, self.tld)
        }
    }

    /// Whether this name is the zone apex
    pub fn is_apex(&self) -> bool {
        self.host == APEX_HOST
    }
}

/// Parse an FQDN into `(sld, tld, host)`
///
/// The last label is the TLD and the second-to-last the SLD; anything before
/// them is the host label, or `@` when nothing is left.
///
/// # Errors
///
/// Returns [`Error::InvalidDomain`] for fewer than two labels or an empty
/// label anywhere in the name.
pub fn parse_fqdn(fqdn: &str) -> Result<DomainParts> {
    let normalized = normalize_fqdn(fqdn.trim());
    let labels: Vec<&str> = normalized.split('.').collect();

    if labels.len() < 2 {
        return Err(Error::invalid_domain(format!(
            "'{}' needs at least two labels",
            fqdn
        )));
    }
    if labels.iter().any(|label| label.is_empty()) {
        return Err(Error::invalid_domain(format!(
            "'{}' has an empty label",
            fqdn
        )));
    }

    let tld = labels[labels.len() - 1];
    let sld = labels[labels.len() - 2];
    let host = if labels.len() > 2 {
        labels[..labels.len() - 2].join(".")
    } else {
        APEX_HOST.to_string()
    };

    Ok(DomainParts {
        sld: sld.to_string(),
        tld: tld.to_string(),
        host,
    })
}

/// The single registered domain this adapter manages
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainFilter {
    sld: String,
    tld: String,
}

impl DomainFilter {
    /// Create a filter; the name must be exactly `{sld}.{tld}`
    pub fn new(filter: &str) -> Result<Self> {
        let parts = parse_fqdn(filter)?;
        if !parts.is_apex() {
            return Err(Error::invalid_domain(format!(
                "domain filter '{}' must have exactly two labels",
                filter
            )));
        }

        Ok(Self {
            sld: parts.sld,
            tld: parts.tld,
        })
    }

    /// Build an optional filter from configuration; blank means "none"
    pub fn from_optional(filter: Option<&str>) -> Result<Option<Self>> {
        match filter.map(str::trim) {
            Some(value) if !value.is_empty() => Self::new(value).map(Some),
            _ => Ok(None),
        }
    }

    /// Second-level label
    pub fn sld(&self) -> &str {
        &self.sld
    }

    /// Top-level label
    pub fn tld(&self) -> &str {
        &self.tld
    }

    /// Resolve an FQDN to its host label under this filter
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDomain`] if the name cannot be parsed
    /// - [`Error::DomainMismatch`] if the name is outside this domain
    pub fn host_for(&self, fqdn: &str) -> Result<String> {
        let parts = parse_fqdn(fqdn)?;
        if parts.sld != self.sld || parts.tld != self.tld {
            return Err(Error::domain_mismatch(normalize_fqdn(fqdn), self.to_string()));
        }
        Ok(parts.host)
    }

    /// Build the FQDN for a registrar host label under this filter
    pub fn fqdn_for(&self, host: &str) -> String {
        DomainParts {
            sld: self.sld.clone(),
            tld: self.tld.clone(),
            host: host.to_ascii_lowercase(),
        }
        .fqdn()
    }

    /// Whether a name belongs to this filter
    pub fn matches(&self, fqdn: &str) -> bool {
        self.host_for(fqdn).is_ok()
    }
}

impl fmt::Display for DomainFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.sld, self.tld)
    }
}
