//! Saved configuration files.
//!
//! A snapshot is the store rendered as `{TABLE: {record: {field: value}}}`.
//! Tables rejected by [`is_persistable_table`] never enter a snapshot, in
//! either direction: `dump` skips them and `read_from_file` drops them from
//! the input, so lock state can neither be saved nor loaded.

use crate::error::{CfgError, Result};
use crate::fs::atomic_write;
use crate::locks::is_persistable_table;
use crate::store::{ConfigStore, Tables};
use std::path::Path;

/// Tables → records → fields.
pub type Snapshot = Tables;

/// Collect every persistable record of `store` in one store operation.
pub fn dump(store: &dyn ConfigStore) -> Result<Snapshot> {
    store.dump_tables(is_persistable_table)
}

/// Replace every persistable record in `store` with the snapshot's contents.
///
/// The replacement is a single store operation: if it fails, the previous
/// configuration is still there. Returns the number of records written.
pub fn restore(store: &dyn ConfigStore, snapshot: &Snapshot) -> Result<usize> {
    store.replace_tables(snapshot, is_persistable_table)
}

/// Write `snapshot` as pretty JSON, atomically.
pub fn write_to_file(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let mut json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| CfgError::UserError(format!("failed to serialize configuration: {}", e)))?;
    json.push('\n');

    atomic_write(path, json.as_bytes()).map_err(|e| {
        CfgError::UserError(format!(
            "failed to write configuration '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Read a saved configuration, dropping any lock table it contains.
pub fn read_from_file(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CfgError::UserError(format!(
            "failed to read configuration '{}': {}",
            path.display(),
            e
        ))
    })?;

    let mut snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
        CfgError::UserError(format!(
            "failed to parse configuration '{}': {}",
            path.display(),
            e
        ))
    })?;

    snapshot.retain(|table, _| {
        let keep = is_persistable_table(table);
        if !keep {
            tracing::warn!(table = %table, file = %path.display(), "ignoring lock table in configuration file");
        }
        keep
    });
    Ok(snapshot)
}
