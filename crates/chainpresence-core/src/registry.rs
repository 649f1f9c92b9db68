//! The presence registry — create-once, existence-checked reads, and a single
//! read-mutate-write path for field updates.
//!
//! Every operation is one unit of work against the injected store: at most one
//! `get` and one `put`. The registry keeps no record state between calls.
//!
//! # Usage
//! ```rust
//! use chainpresence_core::{MemoryStore, NewRecord, Owner, Registry, SocialPlatform};
//!
//! # async fn example() -> Result<(), chainpresence_core::RegistryError> {
//! let registry = Registry::new(MemoryStore::new());
//! registry
//!     .create(
//!         NewRecord::new("A1", Owner::new("John", "Doe"), "Tag1")
//!             .with_handle(SocialPlatform::Twitter, "t1")
//!             .with_validated(true),
//!     )
//!     .await?;
//! registry.update_name_tag("A1", "Tag2").await?;
//! assert!(registry.get("A1").await?.condition.is_used());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::config::{CreateGuard, RegistryConfig};
use crate::error::RegistryError;
use crate::record::{FieldUpdate, NewRecord, Record, SocialPlatform};
use crate::store::KeyValueStore;

/// Registry of presence records backed by a [`KeyValueStore`].
pub struct Registry<S> {
    store: S,
    config: RegistryConfig,
    create_locks: KeyLocks,
}

impl<S: KeyValueStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, RegistryConfig::default())
    }

    pub fn with_config(store: S, config: RegistryConfig) -> Self {
        Self {
            store,
            config,
            create_locks: KeyLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Unconditionally write each record under its `id`, in order.
    ///
    /// Stops at the first failure. Records written before it stay written.
    pub async fn seed(&self, records: &[Record]) -> Result<(), RegistryError> {
        for record in records {
            let bytes = encode(record)?;
            self.store
                .put(&record.id, bytes)
                .await
                .map_err(|e| RegistryError::store(&record.id, e))?;
            debug!(id = %record.id, "seed record written");
        }
        info!(count = records.len(), "registry seeded");
        Ok(())
    }

    /// Create a new record with `condition = UNUSED`.
    ///
    /// Fails with `AlreadyExists` if anything (even empty bytes) is stored
    /// under the id; the stored value is left untouched.
    pub async fn create(&self, new: NewRecord) -> Result<(), RegistryError> {
        let id = new.id.clone();
        let _guard = match self.config.create_guard {
            CreateGuard::KeyLock => Some(self.create_locks.lock(&id).await),
            CreateGuard::Unguarded | CreateGuard::Atomic => None,
        };

        let existing = self
            .store
            .get(&id)
            .await
            .map_err(|e| RegistryError::store(&id, e))?;
        if let Some(existing) = existing {
            return Err(already_exists(&id, &existing));
        }

        let bytes = encode(&new.into_record())?;
        match self.config.create_guard {
            CreateGuard::Atomic => {
                let taken = self
                    .store
                    .put_if_absent(&id, bytes)
                    .await
                    .map_err(|e| RegistryError::store(&id, e))?;
                if let Some(existing) = taken {
                    return Err(already_exists(&id, &existing));
                }
            }
            CreateGuard::Unguarded | CreateGuard::KeyLock => {
                self.store
                    .put(&id, bytes)
                    .await
                    .map_err(|e| RegistryError::store(&id, e))?;
            }
        }

        debug!(id = %id, "record created");
        Ok(())
    }

    /// Read and decode the record stored under `id`.
    pub async fn get(&self, id: &str) -> Result<Record, RegistryError> {
        let bytes = self
            .store
            .get(id)
            .await
            .map_err(|e| RegistryError::store(id, e))?
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })?;

        Record::decode(&bytes).map_err(|source| {
            warn!(id, error = %source, "stored record failed to decode");
            RegistryError::CorruptRecord {
                id: id.to_string(),
                source,
            }
        })
    }

    /// Apply one field mutation and mark the record `USED`.
    ///
    /// Read failures are returned unchanged and nothing is written.
    pub async fn update_field(&self, id: &str, update: FieldUpdate) -> Result<(), RegistryError> {
        let mut record = self.get(id).await?;
        let field = update.field_name();

        update.apply(&mut record);
        record.condition.mark_used();

        let bytes = encode(&record)?;
        self.store
            .put(id, bytes)
            .await
            .map_err(|e| RegistryError::store(id, e))?;

        debug!(id, field, "record updated");
        Ok(())
    }

    pub async fn update_name_tag(
        &self,
        id: &str,
        name_tag: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.update_field(id, FieldUpdate::NameTag(name_tag.into()))
            .await
    }

    pub async fn update_social_handle(
        &self,
        id: &str,
        platform: SocialPlatform,
        handle: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.update_field(
            id,
            FieldUpdate::SocialHandle {
                platform,
                handle: handle.into(),
            },
        )
        .await
    }
}

fn encode(record: &Record) -> Result<Vec<u8>, RegistryError> {
    record.encode().map_err(|source| RegistryError::Encode {
        id: record.id.clone(),
        source,
    })
}

fn already_exists(id: &str, existing: &[u8]) -> RegistryError {
    warn!(id, "create rejected: id already present");
    RegistryError::AlreadyExists {
        id: id.to_string(),
        existing: String::from_utf8_lossy(existing).into_owned(),
    }
}

// ─── Per-key create locks ─────────────────────────────────────────────────────

/// Async mutex per key. Entries live only while some caller holds or waits
/// on the key.
#[derive(Default)]
struct KeyLocks {
    table: Mutex<HashMap<String, KeyEntry>>,
}

#[derive(Default)]
struct KeyEntry {
    lock: Arc<AsyncMutex<()>>,
    /// Holders plus waiters.
    users: usize,
}

impl KeyLocks {
    async fn lock(&self, key: &str) -> KeyLockGuard<'_> {
        let lock = {
            let mut table = self.table.lock().unwrap();
            let entry = table.entry(key.to_string()).or_default();
            entry.users += 1;
            Arc::clone(&entry.lock)
        };
        // Registered before the await: a cancelled waiter deregisters on drop.
        let mut handle = KeyLockGuard {
            locks: self,
            key: key.to_string(),
            guard: None,
        };
        handle.guard = Some(lock.lock_owned().await);
        handle
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.lock().unwrap().len()
    }
}

struct KeyLockGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyLockGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut table = self.locks.table.lock().unwrap();
        if let Some(entry) = table.get_mut(&self.key) {
            entry.users -= 1;
            if entry.users == 0 {
                table.remove(&self.key);
            }
        }
    }
}
