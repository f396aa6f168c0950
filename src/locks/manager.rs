//! The lock state machine.

use super::store::LockStore;
use super::types::{LockSettings, LockState, Renewal};
use super::config_lock_key;
use crate::error::{CfgError, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Acquires, renews and releases one named lock on behalf of one process.
///
/// The state mutex is held for the whole of every operation, so a heartbeat
/// renewal and a foreground release never interleave their store calls.
pub struct ConfigLockManager {
    store: Arc<dyn LockStore>,
    name: String,
    pid: u32,
    ttl: Duration,
    state: Mutex<LockState>,
}

impl std::fmt::Debug for ConfigLockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLockManager")
            .field("name", &self.name)
            .field("pid", &self.pid)
            .field("ttl", &self.ttl)
            .field("state", &self.state())
            .finish()
    }
}

impl ConfigLockManager {
    /// Manager for the configuration lock, owned by the current process.
    pub fn new(store: Arc<dyn LockStore>, settings: LockSettings) -> Self {
        Self {
            store,
            name: config_lock_key(),
            pid: std::process::id(),
            ttl: settings.ttl,
            state: Mutex::new(LockState::Free),
        }
    }

    /// Use `pid` as the owner instead of the current process id.
    pub fn with_owner(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Lock a different store key.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Last observed state.
    pub fn state(&self) -> LockState {
        *self.lock_state()
    }

    fn lock_state(&self) -> MutexGuard<'_, LockState> {
        // Every transition is a single assignment, so a poisoned value is
        // still a valid state.
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Try to take the lock once.
    ///
    /// Fails with [`CfgError::LockUnavailable`] when a live entry exists and
    /// with [`CfgError::StaleLockDetected`] after arming an entry that had no
    /// TTL. Never waits or retries.
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.lock_state();
        if *state == LockState::HeldBySelf {
            tracing::debug!(key = %self.name, pid = self.pid, "lock already held");
            return Ok(());
        }

        if self.store.create_if_absent(&self.name, self.pid, self.ttl)? {
            *state = LockState::HeldBySelf;
            tracing::info!(key = %self.name, pid = self.pid, "lock acquired");
            return Ok(());
        }

        if self.store.has_expiry(&self.name)? {
            let owner = self.store.read(&self.name)?.and_then(|r| r.owner);
            *state = LockState::HeldByOther { owner };
            tracing::info!(key = %self.name, pid = self.pid, owner = ?owner, "can not acquire lock, abort");
            return Err(CfgError::LockUnavailable { owner });
        }

        if self.store.set_expiry(&self.name, self.ttl)? {
            *state = LockState::Stale;
            tracing::warn!(
                key = %self.name,
                pid = self.pid,
                ttl_secs = self.ttl.as_secs_f64(),
                "lock entry had no expiry; timer reset, abort"
            );
            return Err(CfgError::StaleLockDetected);
        }

        // The entry vanished or was armed by someone else between calls.
        *state = LockState::HeldByOther { owner: None };
        tracing::info!(key = %self.name, pid = self.pid, "lock changed concurrently, abort");
        Err(CfgError::LockUnavailable { owner: None })
    }

    /// Keep the lock alive while the caller waits.
    ///
    /// Only meaningful after a successful [`acquire`](Self::acquire). Once a
    /// loss has been observed it is reported again on every call; the entry
    /// is never recreated for an operation that already lost it.
    pub fn reacquire(&self) -> Result<Renewal> {
        let mut state = self.lock_state();
        match *state {
            LockState::HeldBySelf => {}
            LockState::HeldByOther { owner } => return Ok(Renewal::Lost { owner }),
            LockState::Free | LockState::Stale => return Ok(Renewal::NotHeld),
        }

        match self.store.read(&self.name)? {
            Some(record) if record.owner == Some(self.pid) => {
                if self.store.refresh_expiry(&self.name, self.pid, self.ttl)? {
                    tracing::debug!(key = %self.name, pid = self.pid, "lock timer extended");
                    return Ok(Renewal::Extended);
                }
                // Lapsed or replaced since the read.
                self.recreate(&mut state)
            }
            Some(record) => Ok(self.mark_lost(&mut state, record.owner)),
            None => self.recreate(&mut state),
        }
    }

    fn recreate(&self, state: &mut LockState) -> Result<Renewal> {
        if self.store.create_if_absent(&self.name, self.pid, self.ttl)? {
            tracing::info!(key = %self.name, pid = self.pid, "lock reacquired");
            return Ok(Renewal::Reacquired);
        }
        let owner = self.store.read(&self.name)?.and_then(|r| r.owner);
        Ok(self.mark_lost(state, owner))
    }

    fn mark_lost(&self, state: &mut LockState, owner: Option<u32>) -> Renewal {
        *state = LockState::HeldByOther { owner };
        tracing::warn!(key = %self.name, pid = self.pid, owner = ?owner, "lock lost to another holder");
        Renewal::Lost { owner }
    }

    /// Check, before committing, that the lock is still ours.
    pub fn ensure_held(&self) -> Result<()> {
        match self.state() {
            LockState::HeldBySelf => Ok(()),
            LockState::HeldByOther { owner } => Err(CfgError::LockLost { owner }),
            LockState::Free | LockState::Stale => Err(CfgError::LockLost { owner: None }),
        }
    }

    /// Delete the lock entry if this process still holds it.
    ///
    /// Returns whether an entry was deleted. Without ownership this is a
    /// no-op: another holder's entry is never touched.
    pub fn release(&self) -> Result<bool> {
        let mut state = self.lock_state();
        if *state != LockState::HeldBySelf {
            tracing::debug!(key = %self.name, pid = self.pid, state = %*state, "release skipped: lock not held");
            return Ok(false);
        }

        let deleted = self.store.delete(&self.name, self.pid)?;
        *state = LockState::Free;
        if deleted {
            tracing::info!(key = %self.name, pid = self.pid, "lock released");
        } else {
            tracing::debug!(key = %self.name, pid = self.pid, "lock entry already gone at release");
        }
        Ok(deleted)
    }
}
