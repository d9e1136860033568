//! Record shapes on both sides of the adapter
//!
//! - [`DnsRecord`]: one registrar row, one target
//! - [`Endpoint`]: the external-dns wire shape, one name/type with N targets
//! - [`Changes`]: a webhook change batch

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Default TTL the registrar assigns (seconds)
pub const DEFAULT_TTL: u32 = 1800;

/// Default MX preference
pub const DEFAULT_MX_PREF: u16 = 10;

/// Record types surfaced to and accepted from the control plane
pub const MANAGED_TYPES: &[&str] = &["A", "AAAA", "CNAME", "TXT", "MX"];

/// Whether a record type is listed and touched through the webhook
pub fn is_managed_type(record_type: &str) -> bool {
    MANAGED_TYPES
        .iter()
        .any(|managed| managed.eq_ignore_ascii_case(record_type))
}

/// A registrar-native DNS row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Host label, or `@` for the apex
    pub name: String,
    /// Record type, uppercase
    pub record_type: String,
    /// Record value (IP, hostname, text)
    pub address: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// MX preference; only meaningful for MX rows
    pub mx_pref: u16,
    /// Identifier assigned by the registrar, present on fetched rows only
    pub registrar_id: Option<String>,
}

impl DnsRecord {
    /// Create a new record that has not been stored yet
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        address: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            record_type: record_type.into().to_ascii_uppercase(),
            address: address.into(),
            ttl,
            mx_pref: DEFAULT_MX_PREF,
            registrar_id: None,
        }
    }

    /// Set the MX preference
    pub fn with_mx_pref(mut self, mx_pref: u16) -> Self {
        self.mx_pref = mx_pref;
        self
    }

    /// Attach the registrar's identifier
    pub fn with_registrar_id(mut self, id: impl Into<String>) -> Self {
        self.registrar_id = Some(id.into());
        self
    }

    /// Whether this row is an MX record
    pub fn is_mx(&self) -> bool {
        self.record_type == "MX"
    }

    /// Diffing identity: `(name, type, address)`
    ///
    /// TTL and registrar ID do not take part in identity.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.name, &self.record_type, &self.address)
    }

    /// The target string the control plane sees for this row
    ///
    /// MX rows render as `"<pref> <host>"`.
    pub fn target(&self) -> String {
        if self.is_mx() {
            format!("{} {}", self.mx_pref, self.address)
        } else {
            self.address.clone()
        }
    }

    /// Whether this row is covered by a `(name, type, target)` selector
    pub fn matches_target(&self, name: &str, record_type: &str, target: &str) -> bool {
        if self.name != name || !self.record_type.eq_ignore_ascii_case(record_type) {
            return false;
        }
        if self.is_mx() {
            let (pref, host) = split_mx_target(target);
            return self.address == host && pref.is_none_or(|p| p == self.mx_pref);
        }
        self.address == target
    }
}

/// Split an MX target `"10 mail.example.com"` into preference and host
///
/// A target without a leading number yields `(None, target)`.
pub fn split_mx_target(target: &str) -> (Option<u16>, &str) {
    let trimmed = target.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((pref, host)) => match pref.parse::<u16>() {
            Ok(pref) => (Some(pref), host.trim()),
            Err(_) => (None, trimmed),
        },
        None => (None, trimmed),
    }
}

/// Provider-specific key/value carried on an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    /// Property name
    pub name: String,
    /// Property value
    pub value: String,
}

/// An external-dns endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully-qualified name
    pub dns_name: String,

    /// Targets; each one is a separate registrar row
    #[serde(default, deserialize_with = "nullable_list")]
    pub targets: Vec<String>,

    /// Record type
    pub record_type: String,

    /// TTL in seconds; absent or zero means "registrar default"
    #[serde(rename = "recordTTL", default, skip_serializing_if = "Option::is_none")]
    pub record_ttl: Option<i64>,

    /// Set identifier for routing policies
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,

    /// Labels maintained by the control plane
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Provider-specific properties
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

impl Endpoint {
    /// Create an endpoint with the given targets
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        targets: Vec<String>,
        ttl: Option<i64>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            targets,
            record_type: record_type.into(),
            record_ttl: ttl,
            set_identifier: String::new(),
            labels: BTreeMap::new(),
            provider_specific: Vec::new(),
        }
    }

    /// TTL to store at the registrar
    pub fn ttl_or(&self, default_ttl: u32) -> u32 {
        match self.record_ttl {
            Some(ttl) if ttl > 0 => u32::try_from(ttl).unwrap_or(u32::MAX),
            _ => default_ttl,
        }
    }
}

/// A webhook change batch
///
/// Accepts both the lowercase keys and the capitalized keys external-dns
/// emits; `null` lists are read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changes {
    /// Endpoints to create
    #[serde(default, alias = "Create", deserialize_with = "nullable_list")]
    pub create: Vec<Endpoint>,

    /// Previous state of updated endpoints (removed)
    #[serde(default, alias = "UpdateOld", deserialize_with = "nullable_list")]
    pub update_old: Vec<Endpoint>,

    /// New state of updated endpoints (added)
    #[serde(default, alias = "UpdateNew", deserialize_with = "nullable_list")]
    pub update_new: Vec<Endpoint>,

    /// Endpoints to delete
    #[serde(default, alias = "Delete", deserialize_with = "nullable_list")]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// Whether the batch carries no work
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }

    /// Endpoints whose rows are removed
    pub fn removals(&self) -> impl Iterator<Item = &Endpoint> {
        self.delete.iter().chain(self.update_old.iter())
    }

    /// Endpoints whose rows are added
    pub fn additions(&self) -> impl Iterator<Item = &Endpoint> {
        self.create.iter().chain(self.update_new.iter())
    }
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_ttl_and_id() {
        let fetched = DnsRecord::new("www", "A", "1.2.3.4", 1800).with_registrar_id("42");
        let desired = DnsRecord::new("www", "a", "1.2.3.4", 300);
        assert_eq!(fetched.identity(), desired.identity());
        assert_ne!(fetched, desired);
    }

    #[test]
    fn mx_target_round_trip() {
        let record = DnsRecord::new("@", "MX", "mail.example.com", 1800).with_mx_pref(20);
        assert_eq!(record.target(), "20 mail.example.com");
        assert!(record.matches_target("@", "MX", "20 mail.example.com"));
        assert!(record.matches_target("@", "MX", "mail.example.com"));
        assert!(!record.matches_target("@", "MX", "10 mail.example.com"));
    }

    #[test]
    fn split_mx_without_pref() {
        assert_eq!(split_mx_target("mx.example.com"), (None, "mx.example.com"));
        assert_eq!(split_mx_target(" 5  mx.example.com "), (Some(5), "mx.example.com"));
    }

    #[test]
    fn managed_types_are_case_insensitive() {
        assert!(is_managed_type("cname"));
        assert!(is_managed_type("MX"));
        assert!(!is_managed_type("NS"));
        assert!(!is_managed_type("URL301"));
    }

    #[test]
    fn endpoint_ttl_falls_back_to_default() {
        let mut endpoint = Endpoint::new("a.example.com", "A", vec![], None);
        assert_eq!(endpoint.ttl_or(DEFAULT_TTL), DEFAULT_TTL);
        endpoint.record_ttl = Some(0);
        assert_eq!(endpoint.ttl_or(DEFAULT_TTL), DEFAULT_TTL);
        endpoint.record_ttl = Some(300);
        assert_eq!(endpoint.ttl_or(DEFAULT_TTL), 300);
    }

    #[test]
    fn endpoint_uses_external_dns_field_names() {
        let endpoint = Endpoint::new(
            "www.example.com",
            "A",
            vec!["1.2.3.4".to_string()],
            Some(300),
        );
        let json = serde_json::to_value(&endpoint).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dnsName": "www.example.com",
                "targets": ["1.2.3.4"],
                "recordType": "A",
                "recordTTL": 300
            })
        );
    }

    #[test]
    fn endpoint_keeps_optional_fields() {
        let raw = serde_json::json!({
            "dnsName": "txt.example.com",
            "targets": ["\"heritage=external-dns\""],
            "recordType": "TXT",
            "setIdentifier": "blue",
            "labels": {"owner": "default"},
            "providerSpecific": [{"name": "alias", "value": "false"}]
        });
        let endpoint: Endpoint = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(endpoint.set_identifier, "blue");
        assert_eq!(endpoint.labels.get("owner").map(String::as_str), Some("default"));
        assert_eq!(serde_json::to_value(&endpoint).unwrap(), raw);
    }

    #[test]
    fn changes_accept_both_key_styles() {
        let lower: Changes = serde_json::from_str(
            r#"{"create":[{"dnsName":"a.example.com","recordType":"A","targets":["1.2.3.4"]}],"delete":[]}"#,
        )
        .unwrap();
        assert_eq!(lower.create.len(), 1);

        let upper: Changes = serde_json::from_str(
            r#"{"Create":null,"UpdateOld":[{"dnsName":"a.example.com","recordType":"A","targets":null}],"UpdateNew":[],"Delete":null}"#,
        )
        .unwrap();
        assert!(upper.create.is_empty());
        assert_eq!(upper.update_old.len(), 1);
        assert!(upper.update_old[0].targets.is_empty());
        assert_eq!(upper.removals().count(), 1);
        assert_eq!(upper.additions().count(), 0);
    }

    #[test]
    fn empty_body_is_empty_batch() {
        let changes: Changes = serde_json::from_str("{}").unwrap();
        assert!(changes.is_empty());
    }
}
