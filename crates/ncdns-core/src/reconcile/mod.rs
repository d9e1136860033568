//! Reconciliation of incremental changes onto a full record set
//!
//! The registrar only accepts complete record sets. The [`Reconciler`]
//! turns the current set plus a webhook [`Changes`] batch into the next
//! complete set:
//!
//! ```text
//! current ──► validate batch ──► remove deletes ──► append creates ──► next
//! ```
//!
//! The whole batch is validated before the working set is touched, so a
//! single bad endpoint rejects everything. Deletes run before creates, the
//! reverse of a create-then-delete flow: an update expressed as delete-old +
//! create-new for the same target keeps the new row instead of losing it.
//! Rows of types the webhook does not manage (NS, URL, CAA, ...) are carried
//! through untouched.
//!
//! A create is skipped when a row with the same control-plane target already
//! exists. For MX the target includes the preference, so `10 mail` and
//! `20 mail` are distinct rows.

use crate::domain::DomainFilter;
use crate::error::Result;
use crate::record::{
    is_managed_type, split_mx_target, Changes, DnsRecord, Endpoint, DEFAULT_MX_PREF, DEFAULT_TTL,
};
use tracing::{debug, warn};

/// Rows selected for removal by one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Host label
    pub name: String,
    /// Record type, uppercase
    pub record_type: String,
    /// Targets to remove
    pub targets: Vec<String>,
}

impl Removal {
    /// Whether the record is selected by this removal
    pub fn covers(&self, record: &DnsRecord) -> bool {
        self.targets
            .iter()
            .any(|target| record.matches_target(&self.name, &self.record_type, target))
    }
}

/// A validated batch, translated to registrar rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePlan {
    /// Row selectors to remove
    pub removals: Vec<Removal>,
    /// Rows to add
    pub additions: Vec<DnsRecord>,
}

impl ChangePlan {
    /// Whether the plan changes nothing
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Computes next record sets for one domain filter
#[derive(Debug, Clone)]
pub struct Reconciler {
    filter: DomainFilter,
    default_ttl: u32,
    dedupe_creates: bool,
}

impl Reconciler {
    /// Create a reconciler with registrar defaults and create dedup enabled
    pub fn new(filter: DomainFilter) -> Self {
        Self {
            filter,
            default_ttl: DEFAULT_TTL,
            dedupe_creates: true,
        }
    }

    /// TTL used when an endpoint carries none
    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Skip creates whose `(name, type, address)` already exists
    pub fn with_dedupe_creates(mut self, dedupe: bool) -> Self {
        self.dedupe_creates = dedupe;
        self
    }

    /// The domain filter this reconciler is bound to
    pub fn filter(&self) -> &DomainFilter {
        &self.filter
    }

    /// Validate a batch and translate it into registrar rows
    ///
    /// # Errors
    ///
    /// - [`crate::Error::DomainMismatch`] if any endpoint is outside the filter
    /// - [`crate::Error::InvalidDomain`] if any endpoint name is malformed
    pub fn plan(&self, changes: &Changes) -> Result<ChangePlan> {
        let mut plan = ChangePlan::default();

        for endpoint in changes.removals() {
            let Some(name) = self.resolve(endpoint)? else {
                continue;
            };
            plan.removals.push(Removal {
                name,
                record_type: endpoint.record_type.to_ascii_uppercase(),
                targets: endpoint.targets.clone(),
            });
        }

        for endpoint in changes.additions() {
            let Some(name) = self.resolve(endpoint)? else {
                continue;
            };
            let ttl = endpoint.ttl_or(self.default_ttl);
            for target in &endpoint.targets {
                plan.additions
                    .push(to_record(&name, &endpoint.record_type, target, ttl));
            }
        }

        Ok(plan)
    }

    /// Apply a batch to the current full record set
    ///
    /// Pure: the caller fetches `current` and pushes the result.
    pub fn apply(&self, current: Vec<DnsRecord>, changes: &Changes) -> Result<Vec<DnsRecord>> {
        let plan = self.plan(changes)?;
        Ok(self.apply_plan(current, plan))
    }

    /// Apply an already validated plan
    pub fn apply_plan(&self, current: Vec<DnsRecord>, plan: ChangePlan) -> Vec<DnsRecord> {
        let mut working = current;

        for removal in &plan.removals {
            let before = working.len();
            working.retain(|record| !removal.covers(record));
            debug!(
                "Removed {} row(s) for {} {}",
                before - working.len(),
                removal.record_type,
                removal.name
            );
        }

        for record in plan.additions {
            if self.dedupe_creates
                && working.iter().any(|existing| {
                    existing.matches_target(&record.name, &record.record_type, &record.target())
                })
            {
                debug!(
                    "Skipping duplicate create {} {} {}",
                    record.record_type, record.name, record.address
                );
                continue;
            }
            working.push(record);
        }

        working
    }

    /// Map registrar rows to endpoints for listing
    ///
    /// Only managed types are listed. Rows sharing `(name, type)` become one
    /// endpoint with several targets, in first-seen order.
    pub fn endpoints(&self, records: &[DnsRecord]) -> Vec<Endpoint> {
        let mut endpoints: Vec<Endpoint> = Vec::new();
        let mut keys: Vec<(String, String)> = Vec::new();

        for record in records.iter().filter(|r| is_managed_type(&r.record_type)) {
            let dns_name = self.filter.fqdn_for(&record.name);
            let key = (dns_name.clone(), record.record_type.clone());

            match keys.iter().position(|existing| *existing == key) {
                Some(index) => endpoints[index].targets.push(record.target()),
                None => {
                    keys.push(key);
                    endpoints.push(Endpoint::new(
                        dns_name,
                        record.record_type.clone(),
                        vec![record.target()],
                        Some(i64::from(record.ttl)),
                    ));
                }
            }
        }

        endpoints
    }

    /// Host label for an endpoint, or `None` when its type is unmanaged
    fn resolve(&self, endpoint: &Endpoint) -> Result<Option<String>> {
        let host = self.filter.host_for(&endpoint.dns_name)?;
        if !is_managed_type(&endpoint.record_type) {
            warn!(
                "Ignoring {} endpoint {}: record type not managed",
                endpoint.record_type, endpoint.dns_name
            );
            return Ok(None);
        }
        Ok(Some(host))
    }
}

fn to_record(name: &str, record_type: &str, target: &str, ttl: u32) -> DnsRecord {
    let record = DnsRecord::new(name, record_type, target, ttl);
    if !record.is_mx() {
        return record;
    }

    let (pref, host) = split_mx_target(target);
    DnsRecord {
        address: host.to_string(),
        ..record
    }
    .with_mx_pref(pref.unwrap_or(DEFAULT_MX_PREF))
}
