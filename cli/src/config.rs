//! CLI configuration file (YAML).
//!
//! ```yaml
//! registry:
//!   create_guard: atomic
//! storage:
//!   path: ./presence.db
//! log:
//!   level: info
//!   json: false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chainpresence_core::{CreateGuard, RegistryConfig};
use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;

/// Environment variable overriding `storage.path`.
pub const DB_ENV: &str = "CHAINPRESENCE_DB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file path or `sqlite:` URL.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "./presence.db".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl StorageConfig {
    /// `--db` flag, then the environment, then the file value.
    pub fn resolve_path(&self, flag: Option<&str>, env: Option<String>) -> String {
        flag.map(str::to_string)
            .or(env)
            .unwrap_or_else(|| self.path.clone())
    }
}

/// `registry` section of the file.
///
/// Each CLI invocation opens its own `Registry`, so in-process key locks
/// cannot serialize two concurrent `create` runs. Without an explicit guard
/// the CLI relies on the store's `put_if_absent` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySection {
    #[serde(default)]
    pub create_guard: Option<CreateGuard>,
}

impl RegistrySection {
    pub fn to_config(&self) -> RegistryConfig {
        RegistryConfig::with_create_guard(self.create_guard.unwrap_or(CreateGuard::Atomic))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("read config file '{}'", path.display()))?;
                Self::from_yaml(&raw)
                    .with_context(|| format!("parse config file '{}'", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_use_defaults() {
        let config = AppConfig::from_yaml("registry: {}\n").unwrap();
        assert_eq!(config.registry.to_config().create_guard, CreateGuard::Atomic);
        assert_eq!(config.storage.path, "./presence.db");
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn full_file_parses() {
        let config = AppConfig::from_yaml(
            "registry:\n  create_guard: atomic\nstorage:\n  path: /var/lib/presence.db\nlog:\n  level: debug\n  json: true\n",
        )
        .unwrap();
        assert_eq!(config.registry.to_config().create_guard, CreateGuard::Atomic);
        assert_eq!(config.storage.path, "/var/lib/presence.db");
        assert!(config.log.json);
    }

    #[test]
    fn cli_defaults_to_atomic_guard_unless_configured() {
        let config = AppConfig::default();
        assert_eq!(config.registry.to_config().create_guard, CreateGuard::Atomic);

        let config = AppConfig::from_yaml("registry:\n  create_guard: key_lock\n").unwrap();
        assert_eq!(config.registry.to_config().create_guard, CreateGuard::KeyLock);
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let storage = StorageConfig {
            path: "file.db".into(),
        };
        assert_eq!(storage.resolve_path(Some("flag.db"), Some("env.db".into())), "flag.db");
        assert_eq!(storage.resolve_path(None, Some("env.db".into())), "env.db");
        assert_eq!(storage.resolve_path(None, None), "file.db");
    }

    #[test]
    fn unknown_guard_is_rejected() {
        assert!(AppConfig::from_yaml("registry:\n  create_guard: optimistic\n").is_err());
    }
}
