// # Record Set Repository Trait
//
// Defines the interface to a registrar that stores a domain's DNS records
// as one unit.
//
// ## Implementations
//
// - Namecheap: `ncdns-registrar-namecheap` crate
//
// ## Usage
//
// ```rust,ignore
// use ncdns_core::RecordSetRepository;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let repository = /* RecordSetRepository implementation */;
//
//     let mut records = repository.fetch("example", "com").await?;
//     records.retain(|r| r.name != "old");
//     repository.replace("example", "com", &records).await?;
//
//     Ok(())
// }
// ```

use crate::record::DnsRecord;
use async_trait::async_trait;

/// Trait for full-replace registrar backends
///
/// The registrar has no partial update primitive: every change is made by
/// fetching the complete set and pushing a complete replacement.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - `fetch` failures are errors. An implementation must never report a
///   failed fetch as an empty set, because the caller would then push an
///   empty replacement and wipe the domain.
/// - `replace` is all-or-nothing at the registrar and is only confirmed by
///   the registrar's immediate response.
/// - No retries. Retry policy belongs to the control plane.
/// - No caching between calls. The registrar is the only durable store and
///   record identifiers may change on every replace.
#[async_trait]
pub trait RecordSetRepository: Send + Sync {
    /// Fetch the complete current record set of `{sld}.{tld}`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: Every row, including types the webhook does
    ///   not manage
    /// - `Err(Error)`: If the registrar could not be queried
    async fn fetch(&self, sld: &str, tld: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Replace the complete record set of `{sld}.{tld}`
    ///
    /// # Parameters
    ///
    /// - `sld`, `tld`: The registered domain
    /// - `records`: The full desired set, in registrar order
    async fn replace(&self, sld: &str, tld: &str, records: &[DnsRecord])
    -> Result<(), crate::Error>;

    /// Get the registrar name (for logging/debugging)
    fn registrar_name(&self) -> &'static str;
}

/// Helper trait for constructing repositories from configuration
pub trait RecordSetRepositoryFactory: Send + Sync {
    /// Create a RecordSetRepository instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this registrar
    ///
    /// # Returns
    ///
    /// A boxed RecordSetRepository trait object
    fn create(
        &self,
        config: &crate::config::RegistrarConfig,
    ) -> Result<Box<dyn RecordSetRepository>, crate::Error>;
}
