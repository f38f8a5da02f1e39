//! Cascade delete and suspension against the in-memory store, including
//! injected commit failures.

use serde_json::{Value, json};

use opsdesk_auth::Sha256Hasher;
use opsdesk_core::{Tenant, TenantCode, Unit};
use opsdesk_infra::collections::{
    COMPANIES, COMPANY_USERS, FEEDBACK, FIELD_COMPANY_ID, FIELD_STORE_ID, STORE_CONFIGS, STORES,
    TASKS,
};
use opsdesk_infra::{
    FaultyStore, IdentityStore, IdentityStoreExt, InMemoryIdentityStore, Keyed, StoreError,
};
use opsdesk_tenancy::{LifecycleConfig, LifecycleError, TenantLifecycleManager};

fn code(raw: &str) -> TenantCode {
    TenantCode::parse(raw).unwrap()
}

/// ACME01 with `units` units, each carrying a config, `per_unit` tasks and
/// one feedback item, plus two tenant members. OTHER1 has one unit with a
/// task so cross-tenant leakage is visible.
fn seeded(units: usize, per_unit: usize) -> InMemoryIdentityStore {
    let store = InMemoryIdentityStore::new();
    store.insert(COMPANIES, "ACME01", json!({"id": "ACME01", "name": "Acme"})).unwrap();
    store.insert(COMPANIES, "OTHER1", json!({"id": "OTHER1", "name": "Other"})).unwrap();

    for u in 0..units {
        let unit = format!("acme-s{u:03}");
        store.insert(STORES, &unit, json!({"id": unit, "companyId": "ACME01"})).unwrap();
        store.insert(STORE_CONFIGS, &unit, json!({"storeId": unit, "teamMembers": []})).unwrap();
        for t in 0..per_unit {
            store.insert(TASKS, &format!("{unit}-t{t:04}"), json!({"storeId": unit})).unwrap();
        }
        store.insert(FEEDBACK, &format!("{unit}-f"), json!({"storeId": unit})).unwrap();
    }
    for member in ["alice", "bob"] {
        store
            .insert(
                COMPANY_USERS,
                &format!("ACME01__{member}"),
                json!({"companyId": "ACME01", "username": member}),
            )
            .unwrap();
    }

    store.insert(STORES, "other-s1", json!({"id": "other-s1", "companyId": "OTHER1"})).unwrap();
    store.insert(STORE_CONFIGS, "other-s1", json!({"storeId": "other-s1"})).unwrap();
    store.insert(TASKS, "other-t1", json!({"storeId": "other-s1"})).unwrap();
    store
}

async fn owned_by_acme<S: IdentityStore>(store: &S) -> usize {
    let tenant = Value::from("ACME01");
    let units = store.query_by_field(STORES, FIELD_COMPANY_ID, &tenant).await.unwrap();
    let members = store.query_by_field(COMPANY_USERS, FIELD_COMPANY_ID, &tenant).await.unwrap();

    let mut count = units.len() + members.len();
    for u in 0..64 {
        let unit = Value::from(format!("acme-s{u:03}"));
        count += store.query_by_field(TASKS, FIELD_STORE_ID, &unit).await.unwrap().len();
        count += store.query_by_field(FEEDBACK, FIELD_STORE_ID, &unit).await.unwrap().len();
        if store
            .get_by_key(STORE_CONFIGS, unit.as_str().unwrap_or_default())
            .await
            .unwrap()
            .is_some()
        {
            count += 1;
        }
    }
    count
}

#[tokio::test]
async fn cascade_removes_everything_the_tenant_owns() {
    let m = TenantLifecycleManager::new(seeded(3, 2), Sha256Hasher, LifecycleConfig::default());

    let plan = m.plan_tenant_deletion(&code("ACME01")).await.unwrap();
    // 3 units + 3 configs + 6 tasks + 3 feedback + 2 members, then the tenant.
    assert_eq!(plan.total_deletions(), 18);

    let report = m.delete_tenant(&code("ACME01")).await.unwrap();
    assert_eq!(report.deleted, 18);
    assert_eq!(report.batches, 2);

    let store = m.store();
    assert_eq!(store.get_by_key(COMPANIES, "ACME01").await.unwrap(), None);
    assert_eq!(owned_by_acme(store).await, 0);

    assert!(store.get_by_key(COMPANIES, "OTHER1").await.unwrap().is_some());
    assert!(store.get_by_key(STORES, "other-s1").await.unwrap().is_some());
    assert!(store.get_by_key(STORE_CONFIGS, "other-s1").await.unwrap().is_some());
    assert!(store.get_by_key(TASKS, "other-t1").await.unwrap().is_some());
}

#[tokio::test]
async fn large_cascades_are_split_under_the_store_cap() {
    // 20 units * (1 unit + 1 config + 25 tasks + 1 feedback) + 2 members = 562.
    let m = TenantLifecycleManager::new(seeded(20, 25), Sha256Hasher, LifecycleConfig::default());

    let report = m.delete_tenant(&code("ACME01")).await.unwrap();
    assert_eq!(report.deleted, 563);
    assert_eq!(report.batches, 3);
    assert_eq!(owned_by_acme(m.store()).await, 0);
}

#[tokio::test]
async fn failed_batch_keeps_the_tenant_and_a_retry_finishes() {
    let faulty = FaultyStore::new(seeded(4, 5));
    faulty.fail_commit_number(2);
    let m = TenantLifecycleManager::new(faulty, Sha256Hasher, LifecycleConfig::with_batch_size(10));

    let err = m.delete_tenant(&code("ACME01")).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Store(StoreError::Unavailable(_))));
    assert_eq!(m.store().commit_attempts(), 2);

    // The first batch landed, the tenant did not go.
    let tenant: Option<Tenant> = m.store().get_record(COMPANIES, "ACME01").await.unwrap();
    assert!(tenant.is_some());
    let remaining = owned_by_acme(m.store()).await;
    assert!(remaining > 0 && remaining < 4 * 8 + 2);

    m.delete_tenant(&code("ACME01")).await.unwrap();
    assert_eq!(m.store().get_by_key(COMPANIES, "ACME01").await.unwrap(), None);
    assert_eq!(owned_by_acme(m.store()).await, 0);
}

#[tokio::test]
async fn failed_tenant_commit_leaves_only_the_tenant() {
    let faulty = FaultyStore::new(seeded(1, 1));
    // Six dependents fit one batch; the second commit is the tenant record.
    faulty.fail_commit_number(2);
    let m = TenantLifecycleManager::new(faulty, Sha256Hasher, LifecycleConfig::default());

    assert!(m.delete_tenant(&code("ACME01")).await.is_err());
    assert_eq!(owned_by_acme(m.store()).await, 0);
    assert!(m.store().get_by_key(COMPANIES, "ACME01").await.unwrap().is_some());

    m.delete_tenant(&code("ACME01")).await.unwrap();
    assert_eq!(m.store().get_by_key(COMPANIES, "ACME01").await.unwrap(), None);
}

#[tokio::test]
async fn deleting_twice_is_not_an_error() {
    let m = TenantLifecycleManager::new(seeded(2, 1), Sha256Hasher, LifecycleConfig::default());

    m.delete_tenant(&code("ACME01")).await.unwrap();
    let again = m.delete_tenant(&code("ACME01")).await.unwrap();
    assert_eq!(again.deleted, 0);
    assert_eq!(again.batches, 0);
}

#[tokio::test]
async fn deleting_an_unknown_tenant_reports_nothing_removed() {
    let faulty = FaultyStore::new(seeded(1, 0));
    let m = TenantLifecycleManager::new(faulty, Sha256Hasher, LifecycleConfig::default());

    let report = m.delete_tenant(&code("NOPE01")).await.unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.batches, 0);
    assert_eq!(m.store().commit_attempts(), 0);
    assert!(m.store().get_by_key(COMPANIES, "ACME01").await.unwrap().is_some());
}

#[tokio::test]
async fn suspension_reads_back_consistently() {
    let m = TenantLifecycleManager::new(seeded(5, 0), Sha256Hasher, LifecycleConfig::default());

    for expected in [true, false, true] {
        let suspended = m.toggle_suspension(&code("acme01")).await.unwrap();
        assert_eq!(suspended, expected);

        let tenant: Tenant = m.store().get_record(COMPANIES, "ACME01").await.unwrap().unwrap();
        assert_eq!(tenant.is_suspended, expected);

        let units: Vec<Keyed<Unit>> = m
            .store()
            .query_records(STORES, FIELD_COMPANY_ID, &json!("ACME01"))
            .await
            .unwrap();
        assert_eq!(units.len(), 5);
        assert!(units.iter().all(|u| u.record.is_blocked == expected));
    }

    let other: Unit = m.store().get_record(STORES, "other-s1").await.unwrap().unwrap();
    assert!(!other.is_blocked);
}

#[tokio::test]
async fn failed_suspension_commit_changes_nothing() {
    let faulty = FaultyStore::new(seeded(3, 0));
    faulty.fail_commit_number(1);
    let m = TenantLifecycleManager::new(faulty, Sha256Hasher, LifecycleConfig::default());

    assert!(m.toggle_suspension(&code("ACME01")).await.is_err());

    let tenant: Tenant = m.store().get_record(COMPANIES, "ACME01").await.unwrap().unwrap();
    assert!(!tenant.is_suspended);
    let units: Vec<Keyed<Unit>> = m
        .store()
        .query_records(STORES, FIELD_COMPANY_ID, &json!("ACME01"))
        .await
        .unwrap();
    assert!(units.iter().all(|u| !u.record.is_blocked));
}

#[tokio::test]
async fn suspension_larger_than_one_commit_is_refused_whole() {
    let store = seeded(6, 0).with_batch_limit(5);
    let m = TenantLifecycleManager::new(store, Sha256Hasher, LifecycleConfig::default());

    let err = m.toggle_suspension(&code("ACME01")).await.unwrap_err();
    assert_eq!(
        err,
        LifecycleError::Store(StoreError::BatchTooLarge { ops: 7, limit: 5 })
    );
    let tenant: Tenant = m.store().get_record(COMPANIES, "ACME01").await.unwrap().unwrap();
    assert!(!tenant.is_suspended);
}
