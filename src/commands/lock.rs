//! Implementation of `cfglock lock show`.

use super::db::format_ttl;
use crate::context::StoreContext;
use crate::error::Result;
use crate::locks::{LockStore, config_lock_key};
use crate::store::{ConfigStore, Ttl};

/// Execute the `cfglock lock show` command.
pub fn cmd_lock_show(ctx: &StoreContext) -> Result<()> {
    let store = ctx.open_store()?;
    println!("{}", describe_lock(&store)?);
    Ok(())
}

/// One-line status of the configuration lock.
///
/// A record without TTL is reported as `STALE`: the next `save` or `load`
/// arms it and aborts.
pub fn describe_lock<S: ConfigStore>(store: &S) -> Result<String> {
    let key = config_lock_key();
    let Some(record) = store.read(&key)? else {
        return Ok("unlocked".to_string());
    };

    let owner = record
        .owner
        .map_or_else(|| "unknown".to_string(), |pid| pid.to_string());

    Ok(match store.ttl(&key)? {
        // Expired between the two reads.
        Ttl::Missing => "unlocked".to_string(),
        Ttl::Persistent => format!("locked by pid {} (STALE: no expiry)", owner),
        ttl => format!("locked by pid {} ({})", owner, format_ttl(ttl)),
    })
}
