//! Implementation of the `cfglock load` command.
//!
//! Replaces every non-`LOCK` entry of the store with the contents of a saved
//! configuration file, under the configuration lock. A `LOCK` table inside
//! the file is dropped, so loading can never plant or steal a lock.

use super::protected::{Confirmation, run_protected};
use super::record_outcome;
use crate::cli::LoadArgs;
use crate::context::StoreContext;
use crate::error::{CfgError, Result};
use crate::events::EventAction;
use crate::locks::{ConfigLockManager, LockSettings};
use crate::prompt::{Confirm, LinePrompt};
use crate::snapshot;
use crate::store::ConfigStore;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// Execute the `cfglock load` command.
///
/// # Exit Codes
///
/// - 0: Success
/// - 1: Declined prompt, missing or malformed file
/// - 2: Store unavailable
/// - 3: Lock held elsewhere, stale, or lost while waiting
pub fn cmd_load(ctx: &StoreContext, args: LoadArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let path = args
        .file
        .unwrap_or_else(|| config.config_file_path(&ctx.db_dir));

    if !path.is_file() {
        return Err(CfgError::UserError(format!(
            "configuration file '{}' does not exist",
            path.display()
        )));
    }

    let store = Arc::new(ctx.open_store()?);
    let mut terminal = LinePrompt::terminal();
    let prompt: Option<&mut dyn Confirm> = if args.yes { None } else { Some(&mut terminal) };

    let outcome = load_config(store, config.lock_settings(), &path, prompt);

    record_outcome(
        ctx,
        &config,
        EventAction::Load,
        &outcome,
        json!({
            "file": path.display().to_string(),
            "records": outcome.as_ref().map_or(0, |n| *n),
        }),
    );

    let records = outcome?;
    println!("Loaded {} records from {}", records, path.display());
    Ok(())
}

/// Load the configuration in `path` into `store` under the configuration
/// lock. Returns the number of records written.
pub fn load_config<S: ConfigStore + 'static>(
    store: Arc<S>,
    settings: LockSettings,
    path: &Path,
    prompt: Option<&mut dyn Confirm>,
) -> Result<usize> {
    let manager = Arc::new(ConfigLockManager::new(store.clone(), settings));
    let confirmation = prompt.map(|prompt| Confirmation {
        prompt,
        message: format!("Load config from the file {}?", path.display()),
    });

    run_protected(&manager, settings.heartbeat_interval, confirmation, || {
        let snapshot = snapshot::read_from_file(path)?;
        let records = snapshot::restore(&*store, &snapshot)?;
        tracing::info!(file = %path.display(), records, "configuration loaded");
        Ok(records)
    })
}
