//! Test doubles and common utilities for webhook contract tests
//!
//! This module provides an in-memory registrar with the same full-replace
//! semantics as the real one, plus call counters and failure injection.

#![allow(dead_code)]

use ncdns_core::error::{Error, Result};
use ncdns_core::reconcile::Reconciler;
use ncdns_core::traits::RecordSetRepository;
use ncdns_core::{DnsRecord, DomainFilter, Endpoint, WebhookService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An in-memory full-replace registrar
///
/// Clones share state and counters, so a test can keep one handle while the
/// service owns another.
#[derive(Clone, Default)]
pub struct FakeRegistrar {
    /// Stored sets keyed by `(sld, tld)`
    zones: Arc<Mutex<HashMap<(String, String), Vec<DnsRecord>>>>,
    /// Call counter for fetch()
    fetch_call_count: Arc<AtomicUsize>,
    /// Call counter for replace()
    replace_call_count: Arc<AtomicUsize>,
    /// Fail every fetch
    fail_fetch: Arc<Mutex<Option<String>>>,
    /// Fail every replace
    fail_replace: Arc<Mutex<Option<String>>>,
    /// Delay between reading a set and returning it
    fetch_latency: Arc<Mutex<Duration>>,
    /// Source of fresh registrar IDs
    next_id: Arc<AtomicUsize>,
}

impl FakeRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored set of a domain
    pub fn seed(&self, sld: &str, tld: &str, records: Vec<DnsRecord>) {
        let records = records
            .into_iter()
            .map(|record| {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                record.with_registrar_id(id.to_string())
            })
            .collect();
        self.zones
            .lock()
            .unwrap()
            .insert((sld.to_string(), tld.to_string()), records);
    }

    /// The stored set of a domain
    pub fn stored(&self, sld: &str, tld: &str) -> Vec<DnsRecord> {
        self.zones
            .lock()
            .unwrap()
            .get(&(sld.to_string(), tld.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Make every fetch fail with the given registrar message
    pub fn fail_fetch_with(&self, message: &str) {
        *self.fail_fetch.lock().unwrap() = Some(message.to_string());
    }

    /// Make every replace fail with the given registrar message
    pub fn fail_replace_with(&self, message: &str) {
        *self.fail_replace.lock().unwrap() = Some(message.to_string());
    }

    /// Hold every fetch for `latency` after reading the set
    pub fn set_fetch_latency(&self, latency: Duration) {
        *self.fetch_latency.lock().unwrap() = latency;
    }

    /// Get the number of times fetch() was called
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times replace() was called
    pub fn replace_call_count(&self) -> usize {
        self.replace_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecordSetRepository for FakeRegistrar {
    async fn fetch(&self, sld: &str, tld: &str) -> Result<Vec<DnsRecord>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.fail_fetch.lock().unwrap().clone() {
            return Err(Error::registrar(message));
        }

        let snapshot = self.stored(sld, tld);
        let latency = *self.fetch_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(snapshot)
    }

    async fn replace(&self, sld: &str, tld: &str, records: &[DnsRecord]) -> Result<()> {
        self.replace_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.fail_replace.lock().unwrap().clone() {
            return Err(Error::registrar(message));
        }

        // The registrar assigns fresh IDs on every replace.
        self.seed(sld, tld, records.to_vec());
        Ok(())
    }

    fn registrar_name(&self) -> &'static str {
        "fake"
    }
}

/// A service over `registrar` managing `example.com`
pub fn service_for(registrar: &FakeRegistrar) -> WebhookService {
    WebhookService::with_reconciler(
        Box::new(registrar.clone()),
        Some(Reconciler::new(DomainFilter::new("example.com").unwrap())),
    )
}

/// An endpoint with string targets
pub fn endpoint(name: &str, record_type: &str, targets: &[&str], ttl: Option<i64>) -> Endpoint {
    Endpoint::new(
        name,
        record_type,
        targets.iter().map(|t| t.to_string()).collect(),
        ttl,
    )
}

/// `(name, type, address)` of every row, for order-insensitive comparison
pub fn identities(records: &[DnsRecord]) -> Vec<(String, String, String)> {
    let mut ids: Vec<_> = records
        .iter()
        .map(|r| (r.name.clone(), r.record_type.clone(), r.address.clone()))
        .collect();
    ids.sort();
    ids
}

/// A typical parked domain: apex A, www CNAME, registrar NS
pub fn seeded_registrar() -> FakeRegistrar {
    let registrar = FakeRegistrar::new();
    registrar.seed(
        "example",
        "com",
        vec![
            DnsRecord::new("@", "A", "192.0.2.1", 1800),
            DnsRecord::new("www", "CNAME", "example.com", 1800),
            DnsRecord::new("@", "NS", "dns1.registrar-servers.com", 1800),
        ],
    );
    registrar
}
