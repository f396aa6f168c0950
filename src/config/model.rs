//! Config struct definition and defaults.

use serde::{Deserialize, Serialize};

/// Configuration for cfglock.
///
/// This struct represents the contents of `<store>/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Seconds a lock entry lives without renewal.
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,

    /// Seconds between heartbeat renewals while a prompt is open.
    /// Must be smaller than `lock_ttl_secs`.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    // =========================================================================
    // Save/load settings
    // =========================================================================
    /// Saved configuration file. Relative paths resolve against the store
    /// directory.
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Whether to append save/load outcomes to the audit log.
    #[serde(default = "default_true")]
    pub record_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_ttl_secs: default_lock_ttl_secs(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            config_file: default_config_file(),
            record_events: default_true(),
        }
    }
}

pub(crate) fn default_lock_ttl_secs() -> u64 {
    crate::locks::DEFAULT_LOCK_TTL.as_secs()
}
pub(crate) fn default_heartbeat_interval_secs() -> u64 {
    crate::locks::DEFAULT_HEARTBEAT_INTERVAL.as_secs()
}
pub(crate) fn default_config_file() -> String {
    "config_db.json".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}
