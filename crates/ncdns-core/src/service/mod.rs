//! Webhook service
//!
//! The WebhookService is responsible for:
//! - Reporting the configured domain filter
//! - Listing registrar rows as external-dns endpoints
//! - Applying change batches through a full-replace registrar
//! - Echoing endpoints for the adjust hook
//!
//! ## Architecture
//!
//! ```text
//!                    ┌────────────────┐
//!  Changes ────────► │ WebhookService │
//!                    └────────────────┘
//!                            │
//!         ┌──────────────────┼──────────────────────┐
//!         │                  │                      │
//!         ▼                  ▼                      ▼
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────────────┐
//! │ DomainLocks  │   │  Reconciler  │   │ RecordSetRepository │
//! │ (serialize)  │   │  (compute)   │   │ (fetch / replace)   │
//! └──────────────┘   └──────────────┘   └─────────────────────┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. Validate the whole batch against the domain filter
//! 2. Lock the domain
//! 3. Fetch the current full record set
//! 4. Reconcile the batch onto it
//! 5. Replace the record set, unless nothing changed
//!
//! Every step failing aborts the batch. A failure before step 5 leaves the
//! registrar untouched. A failure reported after the registrar accepted
//! step 5 is ambiguous: callers should re-list instead of blindly retrying.

use crate::config::WebhookConfig;
use crate::domain::DomainFilter;
use crate::error::{Error, Result};
use crate::lock::DomainLocks;
use crate::reconcile::Reconciler;
use crate::record::{Changes, Endpoint};
use crate::traits::RecordSetRepository;
use tracing::{debug, info, warn};

/// Result of applying a change batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The registrar's record set was replaced
    Replaced {
        /// Rows before the replace
        previous: usize,
        /// Rows after the replace
        current: usize,
    },
    /// The batch did not change the record set; nothing was pushed
    Unchanged {
        /// Rows in the set
        current: usize,
    },
    /// The batch held no managed endpoints; the registrar was not contacted
    Empty,
}

/// Stateless webhook operations over one registrar
///
/// All durable state lives at the registrar; the service only holds the
/// per-domain locks that serialize its own applies.
pub struct WebhookService {
    /// Registrar backend
    repository: Box<dyn RecordSetRepository>,

    /// Reconciler bound to the domain filter; `None` manages nothing
    reconciler: Option<Reconciler>,

    /// Per-domain critical sections
    locks: DomainLocks,
}

impl WebhookService {
    /// Create a new webhook service
    ///
    /// # Parameters
    ///
    /// - `repository`: Registrar backend
    /// - `config`: Webhook configuration
    pub fn new(repository: Box<dyn RecordSetRepository>, config: &WebhookConfig) -> Result<Self> {
        let reconciler = config.parsed_domain_filter()?.map(|filter| {
            Reconciler::new(filter)
                .with_default_ttl(config.reconcile.default_ttl)
                .with_dedupe_creates(config.reconcile.dedupe_creates)
        });

        Ok(Self::with_reconciler(repository, reconciler))
    }

    /// Create a service from an already built reconciler
    pub fn with_reconciler(
        repository: Box<dyn RecordSetRepository>,
        reconciler: Option<Reconciler>,
    ) -> Self {
        match &reconciler {
            Some(r) => info!(
                "Managing domain {} via {}",
                r.filter(),
                repository.registrar_name()
            ),
            None => warn!("No domain filter configured; managing nothing"),
        }

        Self {
            repository,
            reconciler,
            locks: DomainLocks::new(),
        }
    }

    /// The configured domain filter
    pub fn domain_filter(&self) -> Option<&DomainFilter> {
        self.reconciler.as_ref().map(Reconciler::filter)
    }

    /// List managed records as endpoints
    ///
    /// Without a domain filter this returns an empty list.
    pub async fn records(&self) -> Result<Vec<Endpoint>> {
        let Some(reconciler) = &self.reconciler else {
            return Ok(Vec::new());
        };
        let filter = reconciler.filter();

        let records = self.repository.fetch(filter.sld(), filter.tld()).await?;
        let endpoints = reconciler.endpoints(&records);

        debug!(
            "Listed {} endpoint(s) from {} row(s) for {}",
            endpoints.len(),
            records.len(),
            filter
        );
        Ok(endpoints)
    }

    /// Apply a change batch
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if no domain filter is configured
    /// - [`Error::DomainMismatch`] / [`Error::InvalidDomain`] for bad endpoints;
    ///   the registrar is not contacted
    /// - [`Error::Registrar`] if fetch or replace fails
    pub async fn apply_changes(&self, changes: &Changes) -> Result<ApplyOutcome> {
        let reconciler = self
            .reconciler
            .as_ref()
            .ok_or_else(|| Error::invalid_input("No domain filter configured"))?;
        let filter = reconciler.filter();

        let plan = reconciler.plan(changes)?;
        if plan.is_empty() {
            debug!("Change batch for {} holds no managed endpoints", filter);
            return Ok(ApplyOutcome::Empty);
        }

        info!(
            "Applying changes to {}: {} removal(s), {} addition(s)",
            filter,
            plan.removals.len(),
            plan.additions.len()
        );

        let _guard = self.locks.lock(&filter.to_string()).await;

        let current = self.repository.fetch(filter.sld(), filter.tld()).await?;
        let previous = current.len();
        let next = reconciler.apply_plan(current.clone(), plan);

        if next == current {
            info!("Record set of {} unchanged, skipping replace", filter);
            return Ok(ApplyOutcome::Unchanged { current: previous });
        }

        self.repository
            .replace(filter.sld(), filter.tld(), &next)
            .await?;

        info!(
            "Replaced record set of {}: {} -> {} row(s)",
            filter,
            previous,
            next.len()
        );
        Ok(ApplyOutcome::Replaced {
            previous,
            current: next.len(),
        })
    }

    /// Endpoint adjustment hook; returns the input unchanged
    ///
    /// Endpoints stay untyped JSON so fields this crate does not model,
    /// empty maps and absent keys all survive the round trip.
    pub fn adjust_endpoints(&self, endpoints: Vec<serde_json::Value>) -> Vec<serde_json::Value> {
        endpoints
    }
}
