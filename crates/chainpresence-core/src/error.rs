//! Error types for the presence registry and its store collaborators.

use thiserror::Error;

/// Errors returned by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
///
/// "Key absent" is not an error; backends report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not complete the call (I/O, connection, pool, ...).
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend does not implement the requested operation.
    #[error("Operation '{op}' is not supported by this store")]
    Unsupported { op: &'static str },
}

/// Errors returned by [`Registry`](crate::registry::Registry) operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Record '{id}' already exists with value: {existing}")]
    AlreadyExists { id: String, existing: String },

    #[error("Record '{id}' not found")]
    NotFound { id: String },

    #[error("Record '{id}' is corrupt: {source}")]
    CorruptRecord {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store unavailable for key '{key}': {source}")]
    StoreUnavailable {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to encode record '{id}': {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    /// Returns `true` if the caller may retry the same call with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// The record key this error refers to.
    pub fn key(&self) -> &str {
        match self {
            Self::AlreadyExists { id, .. }
            | Self::NotFound { id }
            | Self::CorruptRecord { id, .. }
            | Self::Encode { id, .. } => id,
            Self::StoreUnavailable { key, .. } => key,
        }
    }

    pub(crate) fn store(key: &str, source: StoreError) -> Self {
        Self::StoreUnavailable {
            key: key.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_failures_are_retryable() {
        let err = RegistryError::store("A1", StoreError::Backend("connection reset".into()));
        assert!(err.is_retryable());
        assert_eq!(err.key(), "A1");

        let err = RegistryError::NotFound { id: "A1".into() };
        assert!(!err.is_retryable());
    }

    #[test]
    fn store_unavailable_keeps_cause() {
        let err = RegistryError::store("A1", StoreError::Unsupported { op: "put_if_absent" });
        let msg = err.to_string();
        assert!(msg.contains("A1"));
        assert!(msg.contains("put_if_absent"));
    }
}
