// # ncdns-core
//
// Core library for the ncdns external-dns webhook.
//
// ## Architecture Overview
//
// external-dns speaks an incremental protocol (create / update / delete
// endpoint). The registrar only accepts a domain's complete record set in
// one call. This library bridges the two:
//
// - **DomainFilter / parse_fqdn**: FQDN ⇄ registrar `(sld, tld, host)`
// - **RecordSetRepository**: Trait for fetching and replacing a full record set
// - **Reconciler**: Applies a change batch to a full set, purely
// - **DomainLocks**: One critical section per domain across fetch → push
// - **WebhookService**: The four webhook operations over the above
// - **http**: axum router exposing the service
// - **RegistrarRegistry**: Plugin-based registry for registrar backends
// - **IpSource**: Trait for discovering the client IP the registrar expects
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from registrar wire formats
// 2. **Whole-batch semantics**: A batch is validated completely before any call
// 3. **Plugin-Based**: Registrars are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library
// 5. **No silent data loss**: Fetch failures are errors, never an empty set

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod lock;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod service;
pub mod traits;

// Re-export core types for convenience
pub use config::{RegistrarConfig, WebhookConfig};
pub use domain::{DomainFilter, DomainParts, parse_fqdn};
pub use error::{Error, Result};
pub use lock::DomainLocks;
pub use reconcile::Reconciler;
pub use record::{Changes, DnsRecord, Endpoint};
pub use registry::RegistrarRegistry;
pub use service::{ApplyOutcome, WebhookService};
pub use traits::{IpSource, RecordSetRepository};
