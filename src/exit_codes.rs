//! Exit code constants for the cfglock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid input, declined prompt)
//! - 2: Store failure (shared store unreachable or corrupt)
//! - 3: Lock failure (held elsewhere, stale lock reset, lock lost)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, or the prompt was declined.
pub const USER_ERROR: i32 = 1;

/// Store failure: the configuration store could not be read or written.
pub const STORE_FAILURE: i32 = 2;

/// Lock failure: the configuration lock could not be acquired or was lost.
pub const LOCK_FAILURE: i32 = 3;
