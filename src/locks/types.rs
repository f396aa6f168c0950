//! Lock state and value types.

use super::{DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_LOCK_TTL};
use std::fmt;
use std::time::Duration;

/// What this process last observed about the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// Not acquired by this process.
    #[default]
    Free,
    /// This process owns the lock entry.
    HeldBySelf,
    /// Another process owns the lock entry. `owner` is `None` when the entry
    /// carried no readable pid.
    HeldByOther { owner: Option<u32> },
    /// An entry without TTL was found and armed by this process.
    Stale,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockState::Free => write!(f, "free"),
            LockState::HeldBySelf => write!(f, "held by self"),
            LockState::HeldByOther { owner: Some(pid) } => write!(f, "held by pid {}", pid),
            LockState::HeldByOther { owner: None } => write!(f, "held by another process"),
            LockState::Stale => write!(f, "stale"),
        }
    }
}

/// Result of one heartbeat renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renewal {
    /// Our entry was still there and its TTL was reset.
    Extended,
    /// Our entry had lapsed and was created again.
    Reacquired,
    /// Another process owns the lock now.
    Lost { owner: Option<u32> },
    /// Nothing to renew: the lock was never acquired or already released.
    NotHeld,
}

/// Contents of the lock entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRecord {
    /// Owning pid, `None` if the `PID` field is missing or not a number.
    pub owner: Option<u32>,
}

/// Timing of the lock protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    /// Lifetime of the lock entry without renewal.
    pub ttl: Duration,
    /// Cadence of heartbeat renewals, shorter than `ttl`.
    pub heartbeat_interval: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_LOCK_TTL,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}
