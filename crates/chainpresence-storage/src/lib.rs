//! chainpresence-storage — durable key-value backends for ChainPresence.
//!
//! Backends:
//! - [`sqlite`] — SQLite via `sqlx` (embedded, single-file persistence)
//!
//! The in-memory store lives in `chainpresence-core` as
//! [`MemoryStore`](chainpresence_core::MemoryStore).

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
