//! Error types for the cfglock CLI.
//!
//! Uses thiserror for derive macros. The lock variants carry the exact
//! abort messages operators grep for in logs and scripts.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for cfglock operations.
#[derive(Error, Debug)]
pub enum CfgError {
    /// User provided invalid arguments or input.
    #[error("{0}")]
    UserError(String),

    /// The confirmation prompt was declined.
    #[error("Aborted!")]
    Aborted,

    /// The shared configuration store could not be reached or parsed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A live, expiring lock record belongs to another process.
    #[error("Can not acquire lock, Abort (held by pid {})", owner_label(.owner))]
    LockUnavailable { owner: Option<u32> },

    /// A lock record without expiry was found and has been armed with one.
    #[error("Can not acquire lock, Reset Timer & Abort")]
    StaleLockDetected,

    /// Ownership moved to another process while waiting on the prompt.
    #[error("Can not acquire lock, Abort (lock lost to pid {} while waiting)", owner_label(.owner))]
    LockLost { owner: Option<u32> },
}

fn owner_label(owner: &Option<u32>) -> String {
    owner.map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
}

impl CfgError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CfgError::UserError(_) | CfgError::Aborted => exit_codes::USER_ERROR,
            CfgError::StoreUnavailable(_) => exit_codes::STORE_FAILURE,
            CfgError::LockUnavailable { .. }
            | CfgError::StaleLockDetected
            | CfgError::LockLost { .. } => exit_codes::LOCK_FAILURE,
        }
    }

    /// Whether this error came from lock contention rather than I/O or input.
    pub fn is_lock_failure(&self) -> bool {
        self.exit_code() == exit_codes::LOCK_FAILURE
    }
}

/// Result type alias for cfglock operations.
pub type Result<T> = std::result::Result<T, CfgError>;
