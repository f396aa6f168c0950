//! RAII release of the configuration lock.

use super::manager::ConfigLockManager;
use crate::error::Result;
use std::sync::Arc;

/// Holds an acquired lock and releases it when dropped.
///
/// Release failures during drop are logged, never panicked on. Release is
/// owner-checked, so dropping a guard whose lock was lost leaves the new
/// holder's entry alone.
#[derive(Debug)]
pub struct LockGuard {
    manager: Arc<ConfigLockManager>,
    released: bool,
}

impl LockGuard {
    /// Acquire `manager`'s lock and wrap it in a guard.
    pub fn acquire(manager: Arc<ConfigLockManager>) -> Result<Self> {
        manager.acquire()?;
        Ok(Self {
            manager,
            released: false,
        })
    }

    /// The manager this guard releases.
    pub fn manager(&self) -> &Arc<ConfigLockManager> {
        &self.manager
    }

    /// Release explicitly, surfacing any store error.
    pub fn release(mut self) -> Result<bool> {
        self.released = true;
        self.manager.release()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.manager.release()
        {
            tracing::warn!(key = %self.manager.name(), error = %e, "failed to release lock");
        }
    }
}
