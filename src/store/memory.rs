//! Single-process store.

use super::keyspace::{Condition, Keyspace, Ttl};
use super::{ConfigStore, Fields, TableFilter, Tables};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

/// Keyspace behind a mutex. Atomic across threads, not across processes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keyspace: Mutex<Keyspace>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, op: impl FnOnce(&mut Keyspace, DateTime<Utc>) -> T) -> T {
        // A panic inside `op` cannot leave the keyspace half-mutated, so a
        // poisoned mutex is still safe to use.
        let mut keyspace = self
            .keyspace
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        let now = Utc::now();
        keyspace.purge_expired(now);
        op(&mut keyspace, now)
    }
}

impl ConfigStore for MemoryStore {
    fn hset_nx_with_ttl(&self, key: &str, fields: &Fields, ttl: Duration) -> Result<bool> {
        Ok(self.with(|ks, now| ks.hset_nx_with_ttl(key, fields, ttl, now)))
    }

    fn hset(&self, key: &str, fields: &Fields) -> Result<()> {
        self.with(|ks, _| ks.hset(key, fields));
        Ok(())
    }

    fn hgetall(&self, key: &str) -> Result<Option<Fields>> {
        Ok(self.with(|ks, _| ks.hgetall(key)))
    }

    fn expire(&self, key: &str, ttl: Duration, when: Condition<'_>) -> Result<bool> {
        Ok(self.with(|ks, now| ks.expire(key, ttl, when, now)))
    }

    fn ttl(&self, key: &str) -> Result<Ttl> {
        Ok(self.with(|ks, now| ks.ttl(key, now)))
    }

    fn del(&self, key: &str, when: Condition<'_>) -> Result<bool> {
        Ok(self.with(|ks, _| ks.del(key, when)))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.with(|ks, _| ks.keys()))
    }

    fn dump_tables(&self, include: TableFilter) -> Result<Tables> {
        Ok(self.with(|ks, _| ks.tables(include)))
    }

    fn replace_tables(&self, tables: &Tables, include: TableFilter) -> Result<usize> {
        Ok(self.with(|ks, _| ks.replace_tables(tables, include)))
    }
}
