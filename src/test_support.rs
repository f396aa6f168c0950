use crate::locks::{ConfigLockManager, LockSettings, LockStore};
use crate::store::{Fields, FileStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A file store in a fresh temporary directory.
pub(crate) fn temp_file_store() -> (TempDir, Arc<FileStore>) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path()).unwrap();
    (temp_dir, Arc::new(store))
}

/// A lock manager acting as process `pid`.
pub(crate) fn manager_as(
    store: Arc<dyn LockStore>,
    pid: u32,
    ttl: Duration,
) -> Arc<ConfigLockManager> {
    let settings = LockSettings {
        ttl,
        heartbeat_interval: ttl / 3,
    };
    Arc::new(ConfigLockManager::new(store, settings).with_owner(pid))
}

pub(crate) fn fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
