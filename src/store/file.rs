//! File-backed store shared by independent processes.

use super::keyspace::{Condition, Keyspace, Ttl};
use super::{ConfigStore, Fields, TableFilter, Tables};
use crate::error::{CfgError, Result};
use crate::fs::atomic_write;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Database file name inside the store directory.
pub const DATABASE_FILE: &str = "db.json";

/// Advisory lock file serializing access to the database file.
pub const GUARD_FILE: &str = "db.lock";

/// Store persisted as `db.json` in a directory.
///
/// Every operation opens `db.lock`, takes an exclusive `flock`, loads the
/// keyspace, purges expired keys, applies the operation and writes the file
/// back only if something changed. The OS drops the `flock` if the process
/// dies, so a crashed caller can never wedge the store itself.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            CfgError::StoreUnavailable(format!(
                "failed to create store directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the database.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `db.json`.
    pub fn database_path(&self) -> PathBuf {
        self.dir.join(DATABASE_FILE)
    }

    fn guard_path(&self) -> PathBuf {
        self.dir.join(GUARD_FILE)
    }

    /// Run `op` against the keyspace while holding the store-wide flock.
    fn transact<T>(&self, op: impl FnOnce(&mut Keyspace, DateTime<Utc>) -> T) -> Result<T> {
        let guard_path = self.guard_path();
        let guard = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&guard_path)
            .map_err(|e| unavailable("open", &guard_path, e))?;
        guard
            .lock_exclusive()
            .map_err(|e| unavailable("lock", &guard_path, e))?;

        let result = self.transact_locked(op);

        if let Err(e) = FileExt::unlock(&guard) {
            tracing::warn!(path = %guard_path.display(), error = %e, "failed to unlock store");
        }
        result
    }

    fn transact_locked<T>(&self, op: impl FnOnce(&mut Keyspace, DateTime<Utc>) -> T) -> Result<T> {
        let mut keyspace = self.load()?;
        let now = Utc::now();
        keyspace.purge_expired(now);

        let value = op(&mut keyspace, now);

        if keyspace.is_dirty() {
            self.persist(&keyspace)?;
        }
        Ok(value)
    }

    fn load(&self) -> Result<Keyspace> {
        let path = self.database_path();
        match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Ok(Keyspace::default()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                CfgError::StoreUnavailable(format!(
                    "failed to parse store '{}': {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Keyspace::default()),
            Err(e) => Err(unavailable("read", &path, e)),
        }
    }

    fn persist(&self, keyspace: &Keyspace) -> Result<()> {
        let path = self.database_path();
        let json = serde_json::to_string_pretty(keyspace).map_err(|e| {
            CfgError::StoreUnavailable(format!("failed to serialize store: {}", e))
        })?;
        atomic_write(&path, json.as_bytes()).map_err(|e| unavailable("write", &path, e))
    }
}

fn unavailable(action: &str, path: &Path, e: std::io::Error) -> CfgError {
    CfgError::StoreUnavailable(format!("failed to {} '{}': {}", action, path.display(), e))
}

impl ConfigStore for FileStore {
    fn hset_nx_with_ttl(&self, key: &str, fields: &Fields, ttl: Duration) -> Result<bool> {
        self.transact(|ks, now| ks.hset_nx_with_ttl(key, fields, ttl, now))
    }

    fn hset(&self, key: &str, fields: &Fields) -> Result<()> {
        self.transact(|ks, _| ks.hset(key, fields))
    }

    fn hgetall(&self, key: &str) -> Result<Option<Fields>> {
        self.transact(|ks, _| ks.hgetall(key))
    }

    fn expire(&self, key: &str, ttl: Duration, when: Condition<'_>) -> Result<bool> {
        self.transact(|ks, now| ks.expire(key, ttl, when, now))
    }

    fn ttl(&self, key: &str) -> Result<Ttl> {
        self.transact(|ks, now| ks.ttl(key, now))
    }

    fn del(&self, key: &str, when: Condition<'_>) -> Result<bool> {
        self.transact(|ks, _| ks.del(key, when))
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.transact(|ks, _| ks.keys())
    }

    fn dump_tables(&self, include: TableFilter) -> Result<Tables> {
        self.transact(|ks, _| ks.tables(include))
    }

    fn replace_tables(&self, tables: &Tables, include: TableFilter) -> Result<usize> {
        // One keyspace mutation, one atomic write of `db.json`.
        self.transact(|ks, _| ks.replace_tables(tables, include))
    }
}
