//! Hash-style configuration store.
//!
//! The store models a key-value database where every key is a composite
//! `TABLE|record` name holding a map of string fields, optionally with a
//! store-managed time-to-live. Expired keys are invisible to every operation
//! and are purged lazily on the next access.
//!
//! # Backends
//!
//! - [`FileStore`]: shared across processes. Each operation runs under an
//!   exclusive advisory lock on `db.lock` and rewrites `db.json` atomically.
//! - [`MemoryStore`]: a single-process keyspace behind a mutex.
//!
//! Both backends share the [`Keyspace`] model, so their semantics cannot
//! drift apart.
//!
//! Whole-table reads and replacements ([`ConfigStore::dump_tables`],
//! [`ConfigStore::replace_tables`]) run as one store operation: a concurrent
//! writer sees either none or all of a replacement, and a failed replacement
//! leaves the previous contents in place.

mod file;
mod keyspace;
mod memory;


pub use file::FileStore;
pub use keyspace::{Condition, Entry, Keyspace, Ttl};
pub use memory::MemoryStore;

use crate::error::Result;
use std::collections::BTreeMap;
use std::time::Duration;

/// Field map stored under one key.
pub type Fields = BTreeMap<String, String>;

/// Tables → records → fields.
pub type Tables = BTreeMap<String, BTreeMap<String, Fields>>;

/// Predicate selecting the tables a bulk operation applies to.
pub type TableFilter = fn(&str) -> bool;

/// Separator between the table and record parts of a key.
pub const KEY_SEPARATOR: char = '|';

/// Join a table and record name into a store key.
pub fn compose_key(table: &str, record: &str) -> String {
    format!("{}{}{}", table, KEY_SEPARATOR, record)
}

/// Split a store key into `(table, record)`.
///
/// Returns `None` for keys without a separator.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(KEY_SEPARATOR)
}

/// Operations of the shared configuration store.
///
/// Every method is atomic with respect to all other callers of the same
/// backing store, including callers in other processes for [`FileStore`].
pub trait ConfigStore: Send + Sync {
    /// Create `key` with `fields` and a TTL, only if the key does not exist.
    ///
    /// Returns `false` without side effects when the key is already present.
    fn hset_nx_with_ttl(&self, key: &str, fields: &Fields, ttl: Duration) -> Result<bool>;

    /// Merge `fields` into `key`, creating it without expiry if absent.
    ///
    /// An existing TTL is preserved.
    fn hset(&self, key: &str, fields: &Fields) -> Result<()>;

    /// All fields of `key`, or `None` if it does not exist.
    fn hgetall(&self, key: &str) -> Result<Option<Fields>>;

    /// Set the TTL of an existing key when `when` holds.
    ///
    /// Returns `false` if the key is absent or the condition failed.
    fn expire(&self, key: &str, ttl: Duration, when: Condition<'_>) -> Result<bool>;

    /// Remaining lifetime of `key`.
    fn ttl(&self, key: &str) -> Result<Ttl>;

    /// Delete `key` when `when` holds. Deleting an absent key returns `false`.
    fn del(&self, key: &str, when: Condition<'_>) -> Result<bool>;

    /// All live keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Every live record of the tables accepted by `include`, read in one
    /// atomic operation. Keys without a table separator are skipped.
    fn dump_tables(&self, include: TableFilter) -> Result<Tables>;

    /// Replace every record of the tables accepted by `include` with the
    /// accepted tables of `tables`, in one atomic operation.
    ///
    /// Written records have no TTL. Keys of other tables and keys without a
    /// separator are left alone. On error nothing has changed. Returns the
    /// number of records written.
    fn replace_tables(&self, tables: &Tables, include: TableFilter) -> Result<usize>;
}
