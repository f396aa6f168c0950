//! Background renewal while the caller waits on a human.

use super::manager::ConfigLockManager;
use super::types::Renewal;
use crate::error::{CfgError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A running heartbeat thread.
///
/// The thread calls [`ConfigLockManager::reacquire`] every `interval` until
/// the session is stopped or dropped. Stopping disconnects the channel the
/// thread sleeps on and joins it, so once `stop` or `drop` returns no further
/// renewal can happen.
#[derive(Debug)]
pub struct HeartbeatSession {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    beats: Arc<AtomicUsize>,
}

impl HeartbeatSession {
    /// Start renewing `manager`'s lock every `interval`.
    pub fn start(manager: Arc<ConfigLockManager>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(CfgError::UserError(
                "heartbeat interval must be greater than 0".to_string(),
            ));
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let beats = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&beats);

        let handle = thread::Builder::new()
            .name("cfglock-heartbeat".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    counter.fetch_add(1, Ordering::SeqCst);
                    match manager.reacquire() {
                        Ok(Renewal::Lost { .. }) | Ok(Renewal::NotHeld) => break,
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "lock heartbeat failed");
                        }
                    }
                }
                tracing::debug!(pid = manager.pid(), "lock heartbeat stopped");
            })
            .map_err(|e| {
                CfgError::UserError(format!("failed to start lock heartbeat: {}", e))
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            beats,
        })
    }

    /// Number of renewals attempted so far.
    pub fn beats(&self) -> usize {
        self.beats.load(Ordering::SeqCst)
    }

    /// Stop the heartbeat and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender wakes the thread with `Disconnected`.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("lock heartbeat thread panicked");
        }
    }
}

impl Drop for HeartbeatSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run `wait` with a heartbeat keeping `manager`'s lock alive.
///
/// The heartbeat is stopped before this returns, including when `wait`
/// panics.
pub fn with_heartbeat<T>(
    manager: &Arc<ConfigLockManager>,
    interval: Duration,
    wait: impl FnOnce() -> T,
) -> Result<T> {
    let session = HeartbeatSession::start(Arc::clone(manager), interval)?;
    let value = wait();
    session.stop();
    Ok(value)
}
