//! The lock-protected flow shared by `save` and `load`.
//!
//! # Steps
//!
//! 1. Acquire the configuration lock (never waits; contention aborts)
//! 2. Ask for confirmation with a heartbeat renewing the lock
//! 3. Reconcile: one final `reacquire`, then require that we still hold it
//! 4. Run the operation
//! 5. Release
//!
//! The lock guard releases on every early return, and the heartbeat is joined
//! before step 3 starts.

use crate::error::{CfgError, Result};
use crate::locks::{ConfigLockManager, LockGuard, with_heartbeat};
use crate::prompt::Confirm;
use std::sync::Arc;
use std::time::Duration;

/// A confirmation to ask while holding the lock.
pub struct Confirmation<'a> {
    pub prompt: &'a mut dyn Confirm,
    pub message: String,
}

/// Run `op` under `manager`'s lock, asking `confirmation` first if given.
///
/// A declined prompt returns [`CfgError::Aborted`]. If ownership moved while
/// the prompt was open, [`CfgError::LockLost`] is returned and `op` never
/// runs, even after a "yes".
pub fn run_protected<T>(
    manager: &Arc<ConfigLockManager>,
    heartbeat_interval: Duration,
    confirmation: Option<Confirmation<'_>>,
    op: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let guard = LockGuard::acquire(Arc::clone(manager))?;

    if let Some(Confirmation { prompt, message }) = confirmation {
        let answer = with_heartbeat(manager, heartbeat_interval, || prompt.confirm(&message))??;
        if !answer {
            return Err(CfgError::Aborted);
        }
    }

    manager.reacquire()?;
    manager.ensure_held()?;

    let value = op()?;

    if let Err(e) = guard.release() {
        tracing::warn!(key = %manager.name(), error = %e, "failed to release lock after commit");
    }
    Ok(value)
}
