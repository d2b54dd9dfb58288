//! Access gate behavior against a scripted partition catalog.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use quarry_access::{AccessGate, AccessScope};
use quarry_core::{Partition, PartitionCatalog, Role, ServiceError, VisibilityFilter};
use rstest::rstest;
use tokio::sync::Notify;

#[derive(Default)]
struct FakeCatalog {
    partitions: Mutex<Vec<Partition>>,
    calls: AtomicUsize,
    failing: AtomicBool,
    /// Park the next lookup after it has read the partitions.
    hold: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl FakeCatalog {
    fn seeded() -> Arc<Self> {
        let catalog = Self::default();
        *catalog.partitions.lock() = vec![
            Partition::new("hr_data", "HR", vec!["name".into(), "rating".into()]),
            Partition::new("finance_data", "finance", vec!["quarter".into()]),
            Partition::new("marketing_data", "marketing", Vec::new()),
            Partition::new("holidays", "general", vec!["date".into()]),
        ];
        Arc::new(catalog)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PartitionCatalog for FakeCatalog {
    async fn partitions(&self) -> Result<Vec<Partition>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable {
                service: "catalog",
                reason: "connection refused".into(),
            });
        }
        let snapshot = self.partitions.lock().clone();
        if self.hold.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        Ok(snapshot)
    }
}

fn gate(catalog: &Arc<FakeCatalog>) -> AccessGate {
    AccessGate::new(Arc::clone(catalog) as Arc<dyn PartitionCatalog>, "c-level", "general")
        .with_known_roles(["finance", "hr", "marketing"])
}

fn role(raw: &str) -> Role {
    Role::new(raw).unwrap()
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[rstest]
#[case("C-Level", &["finance_data", "holidays", "hr_data", "marketing_data"])]
#[case("General", &["holidays"])]
#[case("finance", &["finance_data", "holidays"])]
#[case("hr", &["holidays", "hr_data"])]
#[case("engineering", &[])]
#[tokio::test]
async fn allowed_partitions_by_tier(#[case] raw: &str, #[case] expected: &[&str]) {
    let catalog = FakeCatalog::seeded();
    let gate = gate(&catalog);
    assert_eq!(gate.allowed_partitions(&role(raw)).await, names(expected));
}

#[tokio::test]
async fn other_roles_partitions_never_leak() {
    let catalog = FakeCatalog::seeded();
    let gate = gate(&catalog);
    for raw in ["finance", "hr", "marketing", "general", "sales"] {
        let allowed = gate.allowed_partitions(&role(raw)).await;
        for partition in catalog.partitions.lock().iter() {
            let foreign = partition.label != raw && partition.label != "general";
            if foreign {
                assert!(!allowed.contains(&partition.name), "{raw} sees {}", partition.name);
            }
        }
    }
}

#[tokio::test]
async fn empty_registry_denies_every_member_role() {
    let catalog = FakeCatalog::seeded();
    let gate = AccessGate::new(
        Arc::clone(&catalog) as Arc<dyn PartitionCatalog>,
        "c-level",
        "general",
    );

    assert!(gate.allowed_partitions(&role("finance")).await.is_empty());
    assert_eq!(
        gate.document_visibility_filter(&role("finance")),
        VisibilityFilter::Labels(BTreeSet::new())
    );
    assert_eq!(gate.allowed_partitions(&role("general")).await, names(&["holidays"]));
    assert_eq!(gate.allowed_partitions(&role("c-level")).await.len(), 4);
}

#[tokio::test]
async fn uncanonical_partition_labels_still_match_the_role() {
    let catalog = FakeCatalog::seeded();
    catalog.partitions.lock().push(Partition {
        name: "payroll".into(),
        label: " Finance ".into(),
        columns: Vec::new(),
    });
    let gate = gate(&catalog);

    assert!(gate.allowed_partitions(&role("finance")).await.contains("payroll"));
    assert!(!gate.allowed_partitions(&role("hr")).await.contains("payroll"));
}

#[tokio::test]
async fn decisions_are_cached_until_invalidated() {
    let catalog = FakeCatalog::seeded();
    let gate = gate(&catalog);
    let finance = role("finance");

    gate.allowed_partitions(&finance).await;
    gate.allowed_partitions(&finance).await;
    assert_eq!(catalog.calls(), 1);

    catalog
        .partitions
        .lock()
        .push(Partition::new("budget", "finance", Vec::new()));
    assert!(!gate.allowed_partitions(&finance).await.contains("budget"));

    gate.invalidate_access(&AccessScope::Role(finance.clone()));
    assert!(gate.allowed_partitions(&finance).await.contains("budget"));
    assert_eq!(catalog.calls(), 2);
}

#[tokio::test]
async fn invalidate_all_recomputes_every_role() {
    let catalog = FakeCatalog::seeded();
    let gate = gate(&catalog);
    gate.allowed_partitions(&role("finance")).await;
    gate.allowed_partitions(&role("hr")).await;
    assert_eq!(catalog.calls(), 2);

    gate.invalidate_access(&AccessScope::All);
    gate.allowed_partitions(&role("finance")).await;
    gate.allowed_partitions(&role("hr")).await;
    assert_eq!(catalog.calls(), 4);
}

#[tokio::test]
async fn invalidation_during_a_lookup_is_not_overwritten() {
    let catalog = FakeCatalog::seeded();
    let gate = gate(&catalog);
    let finance = role("finance");

    catalog.hold.store(true, Ordering::SeqCst);
    let (in_flight, ()) = tokio::join!(gate.allowed_partitions(&finance), async {
        catalog.entered.notified().await;
        for partition in catalog.partitions.lock().iter_mut() {
            if partition.name == "hr_data" {
                *partition = Partition::new("hr_data", "finance", partition.columns.clone());
            }
        }
        gate.invalidate_access(&AccessScope::All);
        catalog.release.notify_one();
    });

    // The in-flight caller keeps its own snapshot; the cache must not.
    assert!(!in_flight.contains("hr_data"));
    assert_eq!(
        gate.allowed_partitions(&finance).await,
        names(&["finance_data", "holidays", "hr_data"])
    );
    assert_eq!(catalog.calls(), 2);
}

#[tokio::test]
async fn catalog_failure_is_empty_and_not_cached() {
    let catalog = FakeCatalog::seeded();
    catalog.failing.store(true, Ordering::SeqCst);
    let gate = gate(&catalog);
    let finance = role("finance");

    assert!(gate.allowed_partitions(&finance).await.is_empty());

    catalog.failing.store(false, Ordering::SeqCst);
    assert_eq!(
        gate.allowed_partitions(&finance).await,
        names(&["finance_data", "holidays"])
    );
}

#[tokio::test]
async fn unregistered_role_is_denied_when_registry_is_set() {
    let catalog = FakeCatalog::seeded();
    let gate = gate(&catalog).with_known_roles(["finance", "HR"]);

    assert!(gate.allowed_partitions(&role("sales")).await.is_empty());
    assert_eq!(
        gate.document_visibility_filter(&role("sales")),
        VisibilityFilter::Labels(BTreeSet::new())
    );
    assert_eq!(gate.allowed_partitions(&role("general")).await, names(&["holidays"]));

    gate.register_role(&role("sales"));
    assert_eq!(gate.allowed_partitions(&role("sales")).await, names(&["holidays"]));

    gate.forget_role(&role("finance"));
    assert!(gate.allowed_partitions(&role("finance")).await.is_empty());
}

#[test]
fn visibility_filter_follows_the_same_tiers() {
    let catalog = FakeCatalog::seeded();
    let gate = gate(&catalog);

    assert_eq!(gate.document_visibility_filter(&role("c-level")), VisibilityFilter::All);

    let general = gate.document_visibility_filter(&role("general"));
    assert!(general.allows("general"));
    assert!(!general.allows("finance"));

    let hr = gate.document_visibility_filter(&role("HR"));
    assert!(hr.allows("hr"));
    assert!(hr.allows("General"));
    assert!(!hr.allows("finance"));
}
