//! chainpresence-core — identity/presence records over a pluggable key-value store.
//!
//! # Architecture
//!
//! ```text
//! caller → Registry ── seed / create / get / update_field
//!              │
//!              └── KeyValueStore (memory / SQLite / any get+put backend)
//! ```
//!
//! Records are JSON-encoded and stored under their `id`. Creation is
//! create-once, reads fail loudly on missing or corrupt data, and every field
//! update flips the record's condition from `UNUSED` to `USED`.

pub mod config;
pub mod error;
pub mod record;
pub mod registry;
pub mod seed;
pub mod store;

pub use config::{CreateGuard, RegistryConfig};
pub use error::{RegistryError, StoreError};
pub use record::{Condition, FieldUpdate, NewRecord, Owner, Record, SocialHandles, SocialPlatform};
pub use registry::Registry;
pub use seed::bootstrap_records;
pub use store::{KeyValueStore, MemoryStore};
