//! Key-value store collaborator.
//!
//! The registry never implements storage itself. It talks to a byte-oriented
//! [`KeyValueStore`] that offers per-key atomic `get` / `put`. Durable
//! backends live in `chainpresence-storage`; [`MemoryStore`] here is for tests
//! and ephemeral use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

/// Trait for the backing key-value store.
///
/// Implementations include [`MemoryStore`] and `SqliteStore`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`. `Ok(None)` means absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write (upsert) `value` under `key`.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Write `value` only if `key` is absent, atomically.
    ///
    /// Returns `Ok(None)` when the value was written, or `Ok(Some(existing))`
    /// when the key was already taken. Stores that cannot do this atomically
    /// keep the default, which reports `Unsupported`.
    async fn put_if_absent(
        &self,
        _key: &str,
        _value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unsupported { op: "put_if_absent" })
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, value).await
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).put_if_absent(key, value).await
    }
}

// ─── In-memory store ──────────────────────────────────────────────────────────

/// In-memory key-value store. All data is lost when the value is dropped.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes under `key`, bypassing the async trait. Test helper.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.data.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let mut data = self.data.lock().unwrap();
        if let Some(existing) = data.get(key) {
            return Ok(Some(existing.clone()));
        }
        data.insert(key.to_string(), value);
        Ok(None)
    }
}
