// # Namecheap Registrar
//
// This crate provides the Namecheap backend for the ncdns webhook.
//
// ## Implementation Status
//
// - ✅ Full record set fetch via `namecheap.domains.dns.getHosts`
// - ✅ Full record set replace via `namecheap.domains.dns.setHosts`
// - ✅ Registrar error messages propagated verbatim
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Dry-run mode for safe testing
// - ✅ Sandbox endpoint
// - ❌ NO retry logic (intentionally omitted - external-dns re-runs its loop)
// - ❌ NO caching (every apply re-reads the registrar)
// - ❌ NO per-record API (the registrar has none)
//
// ## Security Requirements
//
// - API key NEVER appears in logs or error messages
// - API key MUST be provided via environment variables only
// - Registrar MUST fail fast if the key or client IP is missing
//
// ## API Reference
//
// - Endpoint: GET `https://api.namecheap.com/xml.response`
// - Every call: `ApiUser`, `ApiKey`, `UserName`, `ClientIp`, `Command`
// - getHosts: `SLD`, `TLD`
// - setHosts: `SLD`, `TLD`, then `HostName{i}`, `RecordType{i}`, `Address{i}`,
//   `TTL{i}` and, for MX rows, `MXPref{i}`

pub mod client;
pub mod envelope;
pub mod repository;

pub use client::{Credentials, NamecheapClient, NAMECHEAP_API_URL, NAMECHEAP_SANDBOX_API_URL};
pub use repository::NamecheapRepository;

use ncdns_core::config::RegistrarConfig;
use ncdns_core::traits::{RecordSetRepository, RecordSetRepositoryFactory};
use ncdns_core::{Error, Result};

/// Factory for creating Namecheap repositories
pub struct NamecheapFactory;

impl RecordSetRepositoryFactory for NamecheapFactory {
    fn create(&self, config: &RegistrarConfig) -> Result<Box<dyn RecordSetRepository>> {
        match config {
            RegistrarConfig::Namecheap {
                api_user,
                api_key,
                username,
                client_ip,
                sandbox,
                dry_run,
            } => {
                config.validate()?;

                let client_ip = client_ip
                    .ok_or_else(|| Error::config("Namecheap client IP is not resolved"))?;

                if *dry_run {
                    tracing::warn!(
                        "Namecheap registrar running in DRY-RUN mode - no changes will be made"
                    );
                }
                if *sandbox {
                    tracing::info!("Namecheap registrar using the sandbox endpoint");
                }

                let client = NamecheapClient::new(
                    Credentials {
                        api_user: api_user.clone(),
                        api_key: api_key.clone(),
                        username: username.clone(),
                        client_ip,
                    },
                    *sandbox,
                )?;

                Ok(Box::new(NamecheapRepository::new(client, *dry_run)))
            }
            _ => Err(Error::config("Invalid config for Namecheap registrar")),
        }
    }
}

/// Register the Namecheap registrar with a registry
///
/// # Example
///
/// ```rust
/// use ncdns_core::RegistrarRegistry;
///
/// let registry = RegistrarRegistry::new();
/// ncdns_registrar_namecheap::register(&registry);
/// assert!(registry.has_registrar("namecheap"));
/// ```
pub fn register(registry: &ncdns_core::RegistrarRegistry) {
    registry.register_registrar("namecheap", Box::new(NamecheapFactory));
}
