//! Implementation of the `cfglock save` command.
//!
//! Writes every table except `LOCK` to a JSON file while holding the
//! configuration lock. The overwrite prompt runs under a heartbeat, and the
//! file is only written if the lock is still ours once it is answered.

use super::protected::{Confirmation, run_protected};
use super::record_outcome;
use crate::cli::SaveArgs;
use crate::context::StoreContext;
use crate::error::Result;
use crate::events::EventAction;
use crate::locks::{ConfigLockManager, LockSettings};
use crate::prompt::{Confirm, LinePrompt};
use crate::snapshot::{self, Snapshot};
use crate::store::ConfigStore;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// Execute the `cfglock save` command.
///
/// # Exit Codes
///
/// - 0: Success
/// - 1: Declined prompt or unwritable file
/// - 2: Store unavailable
/// - 3: Lock held elsewhere, stale, or lost while waiting
pub fn cmd_save(ctx: &StoreContext, args: SaveArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let store = Arc::new(ctx.open_store()?);
    let path = args
        .file
        .unwrap_or_else(|| config.config_file_path(&ctx.db_dir));

    let mut terminal = LinePrompt::terminal();
    let prompt: Option<&mut dyn Confirm> = if args.yes { None } else { Some(&mut terminal) };

    let outcome = save_config(store, config.lock_settings(), &path, prompt);

    record_outcome(
        ctx,
        &config,
        EventAction::Save,
        &outcome,
        json!({
            "file": path.display().to_string(),
            "tables": outcome.as_ref().map_or(0, |s| s.len()),
        }),
    );

    let snapshot = outcome?;
    println!("Saved {} tables to {}", snapshot.len(), path.display());
    Ok(())
}

/// Save `store`'s configuration to `path` under the configuration lock.
///
/// With a `prompt`, asks before overwriting. Returns what was written.
pub fn save_config<S: ConfigStore + 'static>(
    store: Arc<S>,
    settings: LockSettings,
    path: &Path,
    prompt: Option<&mut dyn Confirm>,
) -> Result<Snapshot> {
    let manager = Arc::new(ConfigLockManager::new(store.clone(), settings));
    let confirmation = prompt.map(|prompt| Confirmation {
        prompt,
        message: "Existing file will be overwritten, continue?".to_string(),
    });

    run_protected(&manager, settings.heartbeat_interval, confirmation, || {
        let snapshot = snapshot::dump(&*store)?;
        snapshot::write_to_file(&snapshot, path)?;
        tracing::info!(file = %path.display(), tables = snapshot.len(), "configuration saved");
        Ok(snapshot)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CfgError;
    use crate::locks::{LockStore, config_lock_key};
    use crate::test_support::{fields, temp_file_store};
    use std::time::Duration;

    fn settings() -> LockSettings {
        LockSettings {
            ttl: Duration::from_secs(10),
            heartbeat_interval: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_save_writes_file_without_lock_table() {
        let (temp_dir, store) = temp_file_store();
        store
            .hset("PORT|Ethernet0", &fields(&[("mtu", "9100")]))
            .unwrap();
        let path = temp_dir.path().join("config_db.json");

        let snapshot = save_config(Arc::clone(&store), settings(), &path, None).unwrap();

        assert_eq!(snapshot.len(), 1);
        let saved = snapshot::read_from_file(&path).unwrap();
        assert_eq!(saved["PORT"]["Ethernet0"]["mtu"], "9100");
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("LOCK"));
        assert!(store.read(&config_lock_key()).unwrap().is_none());
    }

    #[test]
    fn test_save_declined_leaves_file_alone() {
        let (temp_dir, store) = temp_file_store();
        let path = temp_dir.path().join("config_db.json");
        std::fs::write(&path, "{}\n").unwrap();
        store.hset("VLAN|Vlan100", &fields(&[("vlanid", "100")])).unwrap();
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new("N\n".as_bytes(), &mut output);

        let err = save_config(Arc::clone(&store), settings(), &path, Some(&mut prompt)).unwrap_err();

        assert!(matches!(err, CfgError::Aborted));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
        assert!(store.read(&config_lock_key()).unwrap().is_none());
        assert!(
            String::from_utf8(output)
                .unwrap()
                .contains("Existing file will be overwritten, continue? [y/N]: ")
        );
    }

    #[test]
    fn test_save_aborts_when_locked_elsewhere() {
        let (temp_dir, store) = temp_file_store();
        store
            .create_if_absent(&config_lock_key(), 4242, Duration::from_secs(10))
            .unwrap();
        let path = temp_dir.path().join("config_db.json");

        let err = save_config(Arc::clone(&store), settings(), &path, None).unwrap_err();

        assert!(matches!(err, CfgError::LockUnavailable { owner: Some(4242) }));
        assert!(!path.exists());
    }
}
