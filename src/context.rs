//! Store directory resolution for cfglock.
//!
//! Every command works against one store directory. It is chosen, in order,
//! from the `--db` flag, the `CFGLOCK_DB_DIR` environment variable, or
//! `./.cfgdb`. All other paths (database, config, audit log) live inside it.

use crate::config::Config;
use crate::error::{CfgError, Result};
use crate::store::FileStore;
use std::env;
use std::path::{Path, PathBuf};

/// Default store directory relative to the working directory.
pub const DEFAULT_DB_DIR: &str = ".cfgdb";

/// Environment variable overriding the store directory.
pub const DB_DIR_ENV: &str = "CFGLOCK_DB_DIR";

/// Config file name inside the store directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Resolved paths for one invocation. All paths are absolute.
#[derive(Debug, Clone)]
pub struct StoreContext {
    /// Store directory.
    pub db_dir: PathBuf,
}

impl StoreContext {
    /// Resolve from an optional `--db` flag, the environment and the working
    /// directory.
    pub fn resolve(flag: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            CfgError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        let dir = match flag {
            Some(dir) => dir.to_path_buf(),
            None => match env::var_os(DB_DIR_ENV) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => PathBuf::from(DEFAULT_DB_DIR),
            },
        };

        Ok(Self::resolve_from(&cwd, dir))
    }

    /// Resolve `dir` against `cwd` without touching the environment.
    pub fn resolve_from<P: AsRef<Path>, Q: AsRef<Path>>(cwd: P, dir: Q) -> Self {
        let dir = dir.as_ref();
        let db_dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            cwd.as_ref().join(dir)
        };
        Self { db_dir }
    }

    /// Path to `config.yaml`.
    pub fn config_path(&self) -> PathBuf {
        self.db_dir.join(CONFIG_FILE)
    }

    /// Directory of the audit log.
    pub fn events_dir(&self) -> PathBuf {
        self.db_dir.join("events")
    }

    /// Load `config.yaml`, falling back to defaults when absent.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path())
    }

    /// Open the shared store in this directory.
    pub fn open_store(&self) -> Result<FileStore> {
        FileStore::open(&self.db_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_from_relative_dir() {
        let ctx = StoreContext::resolve_from("/home/admin", ".cfgdb");
        assert_eq!(ctx.db_dir, Path::new("/home/admin/.cfgdb"));
        assert_eq!(ctx.config_path(), Path::new("/home/admin/.cfgdb/config.yaml"));
        assert_eq!(ctx.events_dir(), Path::new("/home/admin/.cfgdb/events"));
    }

    #[test]
    fn test_resolve_from_absolute_dir() {
        let ctx = StoreContext::resolve_from("/home/admin", "/var/lib/cfgdb");
        assert_eq!(ctx.db_dir, Path::new("/var/lib/cfgdb"));
    }

    #[test]
    #[serial]
    fn test_resolve_prefers_flag_over_env() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: serialized with every other test that touches the environment.
        unsafe { env::set_var(DB_DIR_ENV, "/from/env") };

        let ctx = StoreContext::resolve(Some(temp_dir.path())).unwrap();

        unsafe { env::remove_var(DB_DIR_ENV) };
        assert_eq!(ctx.db_dir, temp_dir.path());
    }

    #[test]
    #[serial]
    fn test_resolve_uses_env_then_default() {
        // SAFETY: serialized with every other test that touches the environment.
        unsafe { env::set_var(DB_DIR_ENV, "/from/env") };
        let from_env = StoreContext::resolve(None).unwrap();
        unsafe { env::remove_var(DB_DIR_ENV) };
        assert_eq!(from_env.db_dir, Path::new("/from/env"));

        let fallback = StoreContext::resolve(None).unwrap();
        assert!(fallback.db_dir.ends_with(DEFAULT_DB_DIR));
    }

    #[test]
    fn test_load_config_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = StoreContext::resolve_from(temp_dir.path(), "db");

        assert_eq!(ctx.load_config().unwrap(), Config::default());
    }

    #[test]
    fn test_open_store_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = StoreContext::resolve_from(temp_dir.path(), "nested/db");

        let store = ctx.open_store().unwrap();

        assert!(ctx.db_dir.is_dir());
        assert_eq!(store.dir(), ctx.db_dir);
    }
}
