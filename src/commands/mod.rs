//! Command implementations for cfglock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the audit helpers shared by `save` and `load`.

mod db;
mod load;
mod lock;
mod protected;
mod save;

pub use db::{cmd_get, cmd_set, format_ttl};
pub use load::{cmd_load, load_config};
pub use lock::{cmd_lock_show, describe_lock};
pub use protected::{Confirmation, run_protected};
pub use save::{cmd_save, save_config};

use crate::cli::{Command, LockAction};
use crate::config::Config;
use crate::context::StoreContext;
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use serde_json::{Value, json};
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// `db` is the `--db` flag, resolved against the environment and working
/// directory before any command runs.
pub fn dispatch(db: Option<&Path>, command: Command) -> Result<()> {
    let ctx = StoreContext::resolve(db)?;

    match command {
        Command::Save(args) => cmd_save(&ctx, args),
        Command::Load(args) => cmd_load(&ctx, args),
        Command::Set(args) => cmd_set(&ctx, args),
        Command::Get(args) => cmd_get(&ctx, args),
        Command::Lock(lock_cmd) => match lock_cmd.action {
            LockAction::Show => cmd_lock_show(&ctx),
        },
    }
}

/// Record how a `save` or `load` ended in the audit log.
///
/// Successes are logged as `action`; any failure as `abort` with the reason.
/// Audit failures are logged and never change the command's outcome.
fn record_outcome<T>(
    ctx: &StoreContext,
    config: &Config,
    action: EventAction,
    outcome: &Result<T>,
    details: Value,
) {
    if !config.record_events {
        return;
    }

    let event = match outcome {
        Ok(_) => Event::new(action).with_details(details),
        Err(e) => Event::new(EventAction::Abort).with_details(json!({
            "command": action.to_string(),
            "reason": e.to_string(),
            "lock_failure": e.is_lock_failure(),
            "request": details,
        })),
    };

    if let Err(e) = append_event(ctx, &event) {
        tracing::warn!(error = %e, "failed to record audit event");
    }
}
