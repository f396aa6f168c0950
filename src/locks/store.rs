//! Atomic lock primitives on top of a [`ConfigStore`].

use super::OWNER_FIELD;
use super::types::LockRecord;
use crate::error::Result;
use crate::store::{Condition, ConfigStore, Fields};
use std::time::Duration;

/// Store operations the lock manager relies on.
///
/// Each call is a single atomic store operation. Owner-checked variants
/// compare the `PID` field inside that same operation, so the manager never
/// acts on a record that changed hands after it was read.
pub trait LockStore: Send + Sync {
    /// Create `{PID: owner}` with `ttl` iff no record exists.
    fn create_if_absent(&self, name: &str, owner: u32, ttl: Duration) -> Result<bool>;

    /// Current record, if any.
    fn read(&self, name: &str) -> Result<Option<LockRecord>>;

    /// `true` iff the record exists and carries a TTL.
    fn has_expiry(&self, name: &str) -> Result<bool>;

    /// Reset the TTL of a record still owned by `owner`.
    ///
    /// Returns `false` if the record vanished or changed owner.
    fn refresh_expiry(&self, name: &str, owner: u32, ttl: Duration) -> Result<bool>;

    /// Arm an expiry-less record with `ttl` without claiming it.
    ///
    /// Returns `false` if there was no record or it already had a TTL.
    fn set_expiry(&self, name: &str, ttl: Duration) -> Result<bool>;

    /// Delete the record if it is owned by `owner`. Idempotent.
    fn delete(&self, name: &str, owner: u32) -> Result<bool>;
}

impl<S: ConfigStore + ?Sized> LockStore for S {
    fn create_if_absent(&self, name: &str, owner: u32, ttl: Duration) -> Result<bool> {
        let mut fields = Fields::new();
        fields.insert(OWNER_FIELD.to_string(), owner.to_string());
        self.hset_nx_with_ttl(name, &fields, ttl)
    }

    fn read(&self, name: &str) -> Result<Option<LockRecord>> {
        Ok(self.hgetall(name)?.map(|fields| LockRecord {
            owner: fields
                .get(OWNER_FIELD)
                .and_then(|pid| pid.trim().parse().ok()),
        }))
    }

    fn has_expiry(&self, name: &str) -> Result<bool> {
        Ok(self.ttl(name)?.has_expiry())
    }

    fn refresh_expiry(&self, name: &str, owner: u32, ttl: Duration) -> Result<bool> {
        let pid = owner.to_string();
        self.expire(
            name,
            ttl,
            Condition::FieldEquals {
                field: OWNER_FIELD,
                value: &pid,
            },
        )
    }

    fn set_expiry(&self, name: &str, ttl: Duration) -> Result<bool> {
        self.expire(name, ttl, Condition::NoExpiry)
    }

    fn delete(&self, name: &str, owner: u32) -> Result<bool> {
        let pid = owner.to_string();
        self.del(
            name,
            Condition::FieldEquals {
                field: OWNER_FIELD,
                value: &pid,
            },
        )
    }
}
