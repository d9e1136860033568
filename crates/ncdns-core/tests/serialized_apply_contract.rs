//! Architectural Contract Test: Serialized Apply
//!
//! This test verifies that concurrent change batches for one domain cannot
//! lose each other's writes.
//!
//! Constraints verified:
//! - fetch → reconcile → replace is one critical section per domain
//! - Two overlapping batches both land in the final record set
//! - A failed batch releases the domain for the next one

mod common;

use common::*;
use ncdns_core::Changes;
use std::sync::Arc;
use std::time::Duration;

fn create(name: &str, target: &str) -> Changes {
    Changes {
        create: vec![endpoint(name, "A", &[target], None)],
        ..Changes::default()
    }
}

#[tokio::test]
async fn concurrent_batches_keep_both_writes() {
    let registrar = FakeRegistrar::new();
    // Widen the window between reading a set and pushing the next one.
    registrar.set_fetch_latency(Duration::from_millis(50));
    let service = Arc::new(service_for(&registrar));

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .apply_changes(&create("a.example.com", "1.1.1.1"))
                .await
        })
    };
    let second = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .apply_changes(&create("b.example.com", "2.2.2.2"))
                .await
        })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    assert_eq!(
        identities(&registrar.stored("example", "com")),
        vec![
            ("a".to_string(), "A".to_string(), "1.1.1.1".to_string()),
            ("b".to_string(), "A".to_string(), "2.2.2.2".to_string()),
        ],
        "Both batches must survive concurrent application"
    );
    assert_eq!(registrar.replace_call_count(), 2);
}

#[tokio::test]
async fn many_concurrent_batches_all_land() {
    let registrar = FakeRegistrar::new();
    registrar.set_fetch_latency(Duration::from_millis(5));
    let service = Arc::new(service_for(&registrar));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let name = format!("host{}.example.com", i);
                let target = format!("10.0.0.{}", i);
                service.apply_changes(&create(&name, &target)).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        registrar.stored("example", "com").len(),
        8,
        "Every batch must be reflected in the final record set"
    );
}

#[tokio::test]
async fn failed_batch_releases_domain() {
    let registrar = FakeRegistrar::new();
    registrar.fail_replace_with("Internal registrar error");
    let service = service_for(&registrar);

    let failed = tokio::time::timeout(
        Duration::from_secs(1),
        service.apply_changes(&create("a.example.com", "1.1.1.1")),
    )
    .await
    .expect("first apply must not hang");
    assert!(failed.is_err());

    let second = tokio::time::timeout(
        Duration::from_secs(1),
        service.apply_changes(&create("b.example.com", "2.2.2.2")),
    )
    .await
    .expect("lock must be released after a failure");
    assert!(second.is_err());
    assert_eq!(registrar.replace_call_count(), 2);
}
