//! Full record set access through `getHosts` / `setHosts`

use crate::client::NamecheapClient;
use async_trait::async_trait;
use ncdns_core::traits::RecordSetRepository;
use ncdns_core::{DnsRecord, Error, Result};

const GET_HOSTS: &str = "namecheap.domains.dns.getHosts";
const SET_HOSTS: &str = "namecheap.domains.dns.setHosts";

/// Namecheap record set repository
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the repository will:
/// - Perform `getHosts` for real
/// - Log the `setHosts` parameters it would send
/// - **NOT** modify the registrar
#[derive(Debug, Clone)]
pub struct NamecheapRepository {
    client: NamecheapClient,
    dry_run: bool,
}

impl NamecheapRepository {
    /// Create a repository over a client
    pub fn new(client: NamecheapClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Whether replacements are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Positional `setHosts` parameters for a full record set
///
/// Rows are numbered from 1. `MXPref{i}` is only sent for MX rows, and
/// `EmailType=MX` is added when the set holds any MX row.
pub fn set_hosts_params(sld: &str, tld: &str, records: &[DnsRecord]) -> Vec<(String, String)> {
    let mut params = vec![
        ("SLD".to_string(), sld.to_string()),
        ("TLD".to_string(), tld.to_string()),
    ];

    for (i, record) in records.iter().enumerate() {
        let i = i + 1;
        params.push((format!("HostName{}", i), record.name.clone()));
        params.push((format!("RecordType{}", i), record.record_type.clone()));
        params.push((format!("Address{}", i), record.address.clone()));
        params.push((format!("TTL{}", i), record.ttl.to_string()));
        if record.is_mx() {
            params.push((format!("MXPref{}", i), record.mx_pref.to_string()));
        }
    }

    if records.iter().any(DnsRecord::is_mx) {
        params.push(("EmailType".to_string(), "MX".to_string()));
    }

    params
}

#[async_trait]
impl RecordSetRepository for NamecheapRepository {
    async fn fetch(&self, sld: &str, tld: &str) -> Result<Vec<DnsRecord>> {
        let params = vec![
            ("SLD".to_string(), sld.to_string()),
            ("TLD".to_string(), tld.to_string()),
        ];
        let response = self.client.invoke(GET_HOSTS, &params).await?;

        let result = response
            .get_hosts
            .ok_or_else(|| Error::registrar("getHosts response has no DomainDNSGetHostsResult"))?;

        if result.is_using_our_dns == Some(false) {
            tracing::warn!(
                "{}.{} is not using registrar DNS; records will not resolve",
                sld,
                tld
            );
        }

        let records: Vec<DnsRecord> = result.hosts.into_iter().map(DnsRecord::from).collect();
        tracing::debug!("Fetched {} row(s) for {}.{}", records.len(), sld, tld);
        Ok(records)
    }

    async fn replace(&self, sld: &str, tld: &str, records: &[DnsRecord]) -> Result<()> {
        let params = set_hosts_params(sld, tld, records);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would replace {}.{} with {} row(s)",
                sld,
                tld,
                records.len()
            );
            for record in records {
                tracing::info!(
                    "[DRY-RUN]   {} {} {} ttl={}",
                    record.name,
                    record.record_type,
                    record.target(),
                    record.ttl
                );
            }
            return Ok(());
        }

        let response = self.client.invoke(SET_HOSTS, &params).await?;

        match response.set_hosts {
            Some(result) if result.is_success => {
                tracing::info!("Replaced {}.{} with {} row(s)", sld, tld, records.len());
                Ok(())
            }
            Some(_) => Err(Error::registrar(format!(
                "setHosts for {}.{} reported IsSuccess=false",
                sld, tld
            ))),
            None => Err(Error::registrar(
                "setHosts response has no DomainDNSSetHostsResult",
            )),
        }
    }

    fn registrar_name(&self) -> &'static str {
        "namecheap"
    }
}
