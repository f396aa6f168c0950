//! Config loading, validation, and derived settings.

use super::model::Config;
use crate::error::{CfgError, Result};
use crate::locks::LockSettings;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// A missing file yields the defaults; unknown fields are ignored.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(CfgError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| CfgError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| CfgError::UserError(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `lock_ttl_secs` must be positive
    /// - `heartbeat_interval_secs` must be positive and below `lock_ttl_secs`
    /// - `config_file` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.lock_ttl_secs == 0 {
            return Err(CfgError::UserError(
                "config validation failed: lock_ttl_secs must be greater than 0".to_string(),
            ));
        }

        if self.heartbeat_interval_secs == 0 {
            return Err(CfgError::UserError(
                "config validation failed: heartbeat_interval_secs must be greater than 0"
                    .to_string(),
            ));
        }

        if self.heartbeat_interval_secs >= self.lock_ttl_secs {
            return Err(CfgError::UserError(format!(
                "config validation failed: heartbeat_interval_secs ({}) must be less than lock_ttl_secs ({})",
                self.heartbeat_interval_secs, self.lock_ttl_secs
            )));
        }

        if self.config_file.trim().is_empty() {
            return Err(CfgError::UserError(
                "config validation failed: config_file must be non-empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Lock timing derived from this config.
    pub fn lock_settings(&self) -> LockSettings {
        LockSettings {
            ttl: Duration::from_secs(self.lock_ttl_secs),
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
        }
    }

    /// Saved configuration path, resolving relative paths against `base`.
    pub fn config_file_path(&self, base: &Path) -> PathBuf {
        let path = Path::new(&self.config_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }
}
