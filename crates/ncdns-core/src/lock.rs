//! Per-domain mutual exclusion
//!
//! The registrar replaces whole record sets, so two interleaved
//! fetch → reconcile → push cycles on the same domain would silently drop
//! one batch. [`DomainLocks`] hands out one async mutex per domain; holding
//! its guard across the whole cycle serializes applies per domain while
//! different domains proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard held for the duration of one reconciliation
pub type DomainGuard = OwnedMutexGuard<()>;

/// Registry of per-domain async locks
#[derive(Debug, Default, Clone)]
pub struct DomainLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl DomainLocks {
    /// Create an empty lock registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a domain
    pub async fn lock(&self, domain: &str) -> DomainGuard {
        self.handle(domain).lock_owned().await
    }

    /// Number of domains that have been locked at least once
    pub fn len(&self) -> usize {
        self.map().len()
    }

    /// Whether no domain has been locked yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn handle(&self, domain: &str) -> Arc<AsyncMutex<()>> {
        let key = domain.to_ascii_lowercase();
        Arc::clone(self.map().entry(key).or_default())
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        // The map is only touched for lookups; a poisoned lock still holds a
        // consistent map.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
