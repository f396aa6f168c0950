//! In-memory keyspace model shared by every store backend.

use super::{Fields, TableFilter, Tables, compose_key, split_key};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// A single key's value: its fields and optional absolute expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Hash fields.
    pub fields: Fields,

    /// When the store removes this entry. `None` means it never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Remaining lifetime of a key, mirroring the three answers of a `TTL` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The key does not exist.
    Missing,
    /// The key exists and never expires.
    Persistent,
    /// The key exists and expires after the given duration.
    Expires(Duration),
}

impl Ttl {
    /// Whether the key exists with an expiry armed.
    pub fn has_expiry(&self) -> bool {
        matches!(self, Ttl::Expires(_))
    }
}

/// Guard evaluated atomically before a conditional `expire` or `del`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition<'a> {
    /// Apply unconditionally.
    Always,
    /// Apply only if the key currently has no expiry.
    NoExpiry,
    /// Apply only if `field` currently holds `value`.
    FieldEquals { field: &'a str, value: &'a str },
}

/// All keys of a store plus a dirty flag for write-back backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Keyspace {
    #[serde(default)]
    entries: BTreeMap<String, Entry>,

    #[serde(skip)]
    dirty: bool,
}

impl Keyspace {
    /// Whether any mutation happened since load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drop every entry whose expiry is at or before `now`.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        if self.entries.len() != before {
            self.dirty = true;
        }
    }

    pub fn hset_nx_with_ttl(
        &mut self,
        key: &str,
        fields: &Fields,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                fields: fields.clone(),
                expires_at: Some(deadline(now, ttl)),
            },
        );
        self.dirty = true;
        true
    }

    pub fn hset(&mut self, key: &str, fields: &Fields) {
        let entry = self.entries.entry(key.to_string()).or_default();
        entry
            .fields
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.dirty = true;
    }

    pub fn hgetall(&self, key: &str) -> Option<Fields> {
        self.entries.get(key).map(|entry| entry.fields.clone())
    }

    pub fn expire(
        &mut self,
        key: &str,
        ttl: Duration,
        when: Condition<'_>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if holds(entry, when) => {
                entry.expires_at = Some(deadline(now, ttl));
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub fn ttl(&self, key: &str, now: DateTime<Utc>) -> Ttl {
        match self.entries.get(key) {
            None => Ttl::Missing,
            Some(Entry {
                expires_at: None, ..
            }) => Ttl::Persistent,
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => Ttl::Expires((*at - now).to_std().unwrap_or(Duration::ZERO)),
        }
    }

    pub fn del(&mut self, key: &str, when: Condition<'_>) -> bool {
        let matches = self.entries.get(key).is_some_and(|entry| holds(entry, when));
        if matches {
            self.entries.remove(key);
            self.dirty = true;
        }
        matches
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn tables(&self, include: TableFilter) -> Tables {
        let mut tables = Tables::new();
        for (key, entry) in &self.entries {
            if let Some((table, record)) = split_key(key)
                && include(table)
            {
                tables
                    .entry(table.to_string())
                    .or_default()
                    .insert(record.to_string(), entry.fields.clone());
            }
        }
        tables
    }

    pub fn replace_tables(&mut self, tables: &Tables, include: TableFilter) -> usize {
        self.entries
            .retain(|key, _| !split_key(key).is_some_and(|(table, _)| include(table)));

        let mut written = 0;
        for (table, records) in tables.iter().filter(|(table, _)| include(table.as_str())) {
            for (record, fields) in records {
                self.entries.insert(
                    compose_key(table, record),
                    Entry {
                        fields: fields.clone(),
                        expires_at: None,
                    },
                );
                written += 1;
            }
        }
        self.dirty = true;
        written
    }
}

fn holds(entry: &Entry, when: Condition<'_>) -> bool {
    match when {
        Condition::Always => true,
        Condition::NoExpiry => entry.expires_at.is_none(),
        Condition::FieldEquals { field, value } => {
            entry.fields.get(field).is_some_and(|v| v == value)
        }
    }
}

/// Absolute expiry for a TTL starting at `now`, saturating on overflow.
fn deadline(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
