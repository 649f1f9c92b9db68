//! End-to-end registry scenarios against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chainpresence_core::{
    Condition, CreateGuard, KeyValueStore, MemoryStore, NewRecord, Owner, Registry,
    RegistryConfig, RegistryError, SocialPlatform, StoreError,
};

/// Yields between every store call so concurrent creates interleave.
#[derive(Default)]
struct YieldingStore(MemoryStore);

#[async_trait]
impl KeyValueStore for YieldingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.0.put(key, value).await
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        tokio::task::yield_now().await;
        self.0.put_if_absent(key, value).await
    }
}

fn a1(name_tag: &str) -> NewRecord {
    NewRecord::new("A1", Owner::new("John", "Doe"), name_tag)
        .with_handle(SocialPlatform::Twitter, "t1")
        .with_validated(true)
}

#[tokio::test]
async fn create_get_update_scenario() {
    let registry = Registry::new(MemoryStore::new());

    registry.create(a1("Tag1")).await.unwrap();
    let record = registry.get("A1").await.unwrap();
    assert_eq!(record.id, "A1");
    assert_eq!(record.owner.name, "John");
    assert_eq!(record.owner.surname, "Doe");
    assert_eq!(record.name_tag, "Tag1");
    assert_eq!(record.handle(SocialPlatform::Twitter), Some("t1"));
    assert!(record.validated);
    assert_eq!(record.condition, Condition::Unused);

    registry.update_name_tag("A1", "Tag2").await.unwrap();
    let record = registry.get("A1").await.unwrap();
    assert_eq!(record.name_tag, "Tag2");
    assert_eq!(record.condition, Condition::Used);
}

#[tokio::test]
async fn duplicate_create_keeps_first_values() {
    let registry = Registry::new(MemoryStore::new());
    registry.create(a1("First")).await.unwrap();

    let err = registry.create(a1("Second")).await.unwrap_err();
    match err {
        RegistryError::AlreadyExists { id, existing } => {
            assert_eq!(id, "A1");
            assert!(existing.contains("First"));
        }
        other => panic!("expected AlreadyExists, got {other:?}"),
    }

    assert_eq!(registry.get("A1").await.unwrap().name_tag, "First");
}

#[tokio::test]
async fn created_record_equals_arguments() {
    let registry = Registry::new(MemoryStore::new());
    let new = NewRecord::new("Z9", Owner::new("", ""), "")
        .with_handle(SocialPlatform::Discord, "")
        .with_handle(SocialPlatform::Instagram, "insta");
    registry.create(new.clone()).await.unwrap();

    let record = registry.get("Z9").await.unwrap();
    assert_eq!(record.owner, new.owner);
    assert_eq!(record.name_tag, new.name_tag);
    assert_eq!(record.social_handles, new.social_handles);
    assert_eq!(record.validated, new.validated);
    assert_eq!(record.condition, Condition::Unused);
}

#[tokio::test]
async fn seeded_records_are_readable_and_creatable_ids_blocked() {
    let registry = Registry::new(MemoryStore::new());
    let records = chainpresence_core::bootstrap_records();
    registry.seed(&records).await.unwrap();

    for record in &records {
        assert_eq!(&registry.get(&record.id).await.unwrap(), record);
    }

    let err = registry
        .create(NewRecord::new("JD2020230001", Owner::new("x", "y"), "z"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));
}

async fn race_creates(guard: CreateGuard) -> (usize, usize) {
    let registry = Arc::new(Registry::with_config(
        YieldingStore::default(),
        RegistryConfig::with_create_guard(guard),
    ));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let registry = Arc::clone(&registry);
        tasks.spawn(async move { registry.create(a1(&format!("Tag{i}"))).await });
    }

    let (mut ok, mut taken) = (0, 0);
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(()) => ok += 1,
            Err(RegistryError::AlreadyExists { .. }) => taken += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    (ok, taken)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn key_lock_guard_claims_id_exactly_once() {
    assert_eq!(race_creates(CreateGuard::KeyLock).await, (1, 15));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn atomic_guard_claims_id_exactly_once() {
    assert_eq!(race_creates(CreateGuard::Atomic).await, (1, 15));
}
