//! Namecheap XML response envelope
//!
//! Every command answers with the same wrapper:
//!
//! ```xml
//! <ApiResponse Status="OK">
//!   <Errors />
//!   <CommandResponse Type="namecheap.domains.dns.getHosts">
//!     <DomainDNSGetHostsResult Domain="example.com" IsUsingOurDNS="true">
//!       <host HostId="12" Name="@" Type="A" Address="192.0.2.1" MXPref="10" TTL="1800" />
//!     </DomainDNSGetHostsResult>
//!   </CommandResponse>
//! </ApiResponse>
//! ```
//!
//! Only the parts the webhook reads are modelled; everything else is skipped.

use ncdns_core::record::{DEFAULT_MX_PREF, DEFAULT_TTL};
use ncdns_core::{DnsRecord, Error, Result};
use serde::Deserialize;

/// Root `<ApiResponse>` element
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    /// `OK` or `ERROR`
    #[serde(rename = "@Status")]
    pub status: String,

    /// Error list; empty on success
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,

    /// Command payload; absent on failure
    #[serde(rename = "CommandResponse")]
    pub command_response: Option<CommandResponse>,
}

impl ApiResponse {
    /// Parse a raw response body
    pub fn parse(body: &str) -> Result<Self> {
        quick_xml::de::from_str(body)
            .map_err(|e| Error::registrar(format!("Malformed registrar response: {}", e)))
    }

    /// Whether the registrar reported success
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("OK")
    }

    /// Turn a failed envelope into an error, keeping every message verbatim
    pub fn into_result(self) -> Result<CommandResponse> {
        if !self.is_ok() {
            let mut messages: Vec<String> = self
                .errors
                .items
                .into_iter()
                .map(|e| e.message.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if messages.is_empty() {
                messages.push(format!("Registrar returned status {}", self.status));
            }
            return Err(Error::registrar_messages(messages));
        }

        self.command_response
            .ok_or_else(|| Error::registrar("Response has no CommandResponse"))
    }
}

/// `<Errors>` element
#[derive(Debug, Default, Deserialize)]
pub struct ErrorList {
    #[serde(rename = "Error", default)]
    pub items: Vec<ErrorItem>,
}

/// One `<Error Number="...">message</Error>`
///
/// Only the message is surfaced; the `Number` attribute is ignored.
#[derive(Debug, Deserialize)]
pub struct ErrorItem {
    #[serde(rename = "$text", default)]
    pub message: String,
}

/// `<CommandResponse>` element
#[derive(Debug, Default, Deserialize)]
pub struct CommandResponse {
    #[serde(rename = "DomainDNSGetHostsResult")]
    pub get_hosts: Option<GetHostsResult>,

    #[serde(rename = "DomainDNSSetHostsResult")]
    pub set_hosts: Option<SetHostsResult>,
}

/// `namecheap.domains.dns.getHosts` payload
#[derive(Debug, Deserialize)]
pub struct GetHostsResult {
    #[serde(rename = "@Domain", default)]
    pub domain: String,

    #[serde(rename = "@IsUsingOurDNS", default)]
    pub is_using_our_dns: Option<bool>,

    #[serde(rename = "host", default)]
    pub hosts: Vec<Host>,
}

/// One `<host>` row
#[derive(Debug, Deserialize)]
pub struct Host {
    #[serde(rename = "@HostId", default)]
    pub host_id: Option<String>,

    #[serde(rename = "@Name")]
    pub name: String,

    #[serde(rename = "@Type")]
    pub record_type: String,

    #[serde(rename = "@Address", default)]
    pub address: String,

    #[serde(rename = "@TTL", default = "default_ttl")]
    pub ttl: u32,

    #[serde(rename = "@MXPref", default = "default_mx_pref")]
    pub mx_pref: u16,
}

impl From<Host> for DnsRecord {
    fn from(host: Host) -> Self {
        let record = DnsRecord::new(host.name, host.record_type, host.address, host.ttl)
            .with_mx_pref(host.mx_pref);
        match host.host_id {
            Some(id) => record.with_registrar_id(id),
            None => record,
        }
    }
}

/// `namecheap.domains.dns.setHosts` payload
#[derive(Debug, Deserialize)]
pub struct SetHostsResult {
    #[serde(rename = "@Domain", default)]
    pub domain: String,

    #[serde(rename = "@IsSuccess", default)]
    pub is_success: bool,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_mx_pref() -> u16 {
    DEFAULT_MX_PREF
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_HOSTS_OK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <Warnings />
  <RequestedCommand>namecheap.domains.dns.getHosts</RequestedCommand>
  <CommandResponse Type="namecheap.domains.dns.getHosts">
    <DomainDNSGetHostsResult Domain="example.com" EmailType="MX" IsUsingOurDNS="true">
      <host HostId="101" Name="@" Type="A" Address="192.0.2.1" MXPref="10" TTL="1800" AssociatedAppTitle="" FriendlyName="" IsActive="true" IsDDNSEnabled="false" />
      <host HostId="102" Name="www" Type="CNAME" Address="example.com." MXPref="10" TTL="300" />
      <host HostId="103" Name="@" Type="MX" Address="mail.example.com." MXPref="5" TTL="1800" />
      <host HostId="104" Name="txt" Type="TXT" Address="v=spf1 -all" />
    </DomainDNSGetHostsResult>
  </CommandResponse>
  <Server>PHX01APIEXT01</Server>
  <GMTTimeDifference>--5:00</GMTTimeDifference>
  <ExecutionTime>0.012</ExecutionTime>
</ApiResponse>"#;

    const ERROR_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="ERROR" xmlns="http://api.namecheap.com/xml.response">
  <Errors>
    <Error Number="1011150">Parameter RequestIP is invalid</Error>
    <Error Number="2030166">Domain is invalid</Error>
  </Errors>
  <Warnings />
  <CommandResponse />
</ApiResponse>"#;

    #[test]
    fn test_parse_get_hosts() {
        let command = ApiResponse::parse(GET_HOSTS_OK)
            .unwrap()
            .into_result()
            .unwrap();
        let result = command.get_hosts.unwrap();

        assert_eq!(result.domain, "example.com");
        assert_eq!(result.is_using_our_dns, Some(true));
        assert_eq!(result.hosts.len(), 4);

        let records: Vec<DnsRecord> = result.hosts.into_iter().map(DnsRecord::from).collect();
        assert_eq!(records[0].name, "@");
        assert_eq!(records[0].registrar_id.as_deref(), Some("101"));
        assert_eq!(records[1].ttl, 300);
        assert_eq!(records[2].mx_pref, 5);
        // Missing attributes fall back to registrar defaults.
        assert_eq!(records[3].ttl, DEFAULT_TTL);
        assert_eq!(records[3].mx_pref, DEFAULT_MX_PREF);
    }

    #[test]
    fn test_error_messages_kept_verbatim() {
        let result = ApiResponse::parse(ERROR_RESPONSE).unwrap().into_result();

        match result {
            Err(Error::Registrar { messages }) => assert_eq!(
                messages,
                vec!["Parameter RequestIP is invalid", "Domain is invalid"]
            ),
            other => panic!("expected registrar error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_number_attribute_is_optional() {
        let body = r#"<ApiResponse Status="ERROR"><Errors>
            <Error>  Invalid request IP  </Error>
            <Error Number="3031510"></Error>
        </Errors></ApiResponse>"#;
        let result = ApiResponse::parse(body).unwrap().into_result();

        match result {
            Err(Error::Registrar { messages }) => {
                assert_eq!(messages, vec!["Invalid request IP"])
            }
            other => panic!("expected registrar error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_without_messages() {
        let body = r#"<ApiResponse Status="ERROR"><Errors /></ApiResponse>"#;
        let result = ApiResponse::parse(body).unwrap().into_result();

        match result {
            Err(Error::Registrar { messages }) => {
                assert_eq!(messages, vec!["Registrar returned status ERROR"])
            }
            other => panic!("expected registrar error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_set_hosts() {
        let body = r#"<ApiResponse Status="OK"><Errors /><CommandResponse Type="namecheap.domains.dns.setHosts"><DomainDNSSetHostsResult Domain="example.com" IsSuccess="true" /></CommandResponse></ApiResponse>"#;
        let command = ApiResponse::parse(body).unwrap().into_result().unwrap();

        let result = command.set_hosts.unwrap();
        assert_eq!(result.domain, "example.com");
        assert!(result.is_success);
    }

    #[test]
    fn test_malformed_body() {
        let result = ApiResponse::parse("<html><body>Bad Gateway</body></html>");
        assert!(matches!(result, Err(Error::Registrar { .. })));
    }
}
