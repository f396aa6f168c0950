//! Configuration lock shared by every `save`/`load` invocation.
//!
//! The lock is a single hash entry `LOCK|configDbLock` in the configuration
//! store whose `PID` field names the owning process. Existence of the entry
//! *is* the lock; the store removes it when its time-to-live elapses, so a
//! crashed holder heals itself after at most one TTL.
//!
//! # Protocol
//!
//! - `acquire` creates the entry with a TTL in one atomic store call and never
//!   waits. Contention is reported immediately and the caller aborts.
//! - An entry without TTL is stale. The contender arms it with a TTL and still
//!   aborts; the next attempt after the TTL succeeds.
//! - `reacquire` runs from a [`HeartbeatSession`] while a human answers a
//!   prompt. It extends our own entry, recreates it if it lapsed, or records
//!   that someone else owns it now. A recorded loss is final.
//! - `release` deletes the entry only while we still own it.
//!
//! # RAII
//!
//! [`LockGuard`] releases on drop and [`HeartbeatSession`] joins its thread on
//! drop, so every exit path of a command tears both down.

mod guard;
mod heartbeat;
mod manager;
mod store;
mod types;


pub use guard::LockGuard;
pub use heartbeat::{HeartbeatSession, with_heartbeat};
pub use manager::ConfigLockManager;
pub use store::LockStore;
pub use types::{LockRecord, LockSettings, LockState, Renewal};

use crate::store::compose_key;
use std::time::Duration;

/// Table holding the lock entry.
pub const LOCK_TABLE: &str = "LOCK";

/// Record name of the configuration lock.
pub const LOCK_RECORD: &str = "configDbLock";

/// Field holding the owner's process id.
pub const OWNER_FIELD: &str = "PID";

/// Default lock time-to-live.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(10);

/// Default heartbeat interval, comfortably below the TTL.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(3);

/// Store key of the configuration lock.
pub fn config_lock_key() -> String {
    compose_key(LOCK_TABLE, LOCK_RECORD)
}

/// Whether a table may be written to or read from a saved configuration file.
///
/// Lock state is runtime-only and must never be persisted or restored.
pub fn is_persistable_table(table: &str) -> bool {
    table != LOCK_TABLE
}
