//! Top-level configuration with file and environment resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ReplicaConfig, StorageConfig};
use crate::constants::{DB_PATH_ENV_VAR, MACHINE_ID_ENV_VAR, MAX_READ_POOL_SIZE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`KVCHAIN_DB_PATH`, `KVCHAIN_MACHINE_ID`)
/// 2. TOML file
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KvConfig {
    pub storage: StorageConfig,
    pub replica: ReplicaConfig,
}

impl KvConfig {
    /// Load from a TOML file, apply env overrides, validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: KvConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML string without env overrides.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: KvConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a machine with an in-memory-friendly default storage section.
    pub fn for_machine(machine_id: impl Into<String>) -> Self {
        Self {
            replica: ReplicaConfig {
                machine_id: machine_id.into(),
                ..ReplicaConfig::default()
            },
            ..Self::default()
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(DB_PATH_ENV_VAR) {
            if !path.is_empty() {
                self.storage.db_path = path;
            }
        }
        if let Ok(machine_id) = std::env::var(MACHINE_ID_ENV_VAR) {
            if !machine_id.is_empty() {
                self.replica.machine_id = machine_id;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replica.machine_id.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "replica.machine_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.replica.max_merge_passes == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "replica.max_merge_passes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(1..=MAX_READ_POOL_SIZE).contains(&self.storage.read_pool_size) {
            return Err(ConfigError::ValidationFailed {
                field: "storage.read_pool_size".to_string(),
                message: format!("must be between 1 and {MAX_READ_POOL_SIZE}"),
            });
        }
        if self.storage.db_path.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "storage.db_path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
