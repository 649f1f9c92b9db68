//! Registry configuration.

use serde::{Deserialize, Serialize};

/// How `create` protects the read-then-write-if-absent sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateGuard {
    /// Plain `get` then `put`. Two concurrent creates of one id can both pass
    /// the existence check; the later write wins.
    Unguarded,
    /// Serialize creates of the same id inside this registry instance.
    /// Does not protect against other processes writing the same store.
    #[default]
    KeyLock,
    /// Final write goes through the store's `put_if_absent`.
    Atomic,
}

/// Top-level registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub create_guard: CreateGuard,
}

impl RegistryConfig {
    pub fn with_create_guard(create_guard: CreateGuard) -> Self {
        Self { create_guard }
    }
}
