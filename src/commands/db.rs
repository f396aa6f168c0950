//! `cfglock set` and `cfglock get`: direct record access.
//!
//! These bypass the configuration lock. `set` writes without a TTL, which is
//! also how an operator reproduces a stale lock by hand.

use crate::cli::{GetArgs, SetArgs};
use crate::context::StoreContext;
use crate::error::{CfgError, Result};
use crate::store::{ConfigStore, Fields, KEY_SEPARATOR, Ttl, compose_key};
use std::time::Duration;

/// Execute the `cfglock set` command.
pub fn cmd_set(ctx: &StoreContext, args: SetArgs) -> Result<()> {
    let key = record_key(&args.table, &args.record)?;
    let fields = parse_pairs(&args.pairs)?;

    let store = ctx.open_store()?;
    store.hset(&key, &fields)?;

    println!("Set {} field(s) on {}", fields.len(), key);
    Ok(())
}

/// Execute the `cfglock get` command.
pub fn cmd_get(ctx: &StoreContext, args: GetArgs) -> Result<()> {
    let key = record_key(&args.table, &args.record)?;
    let store = ctx.open_store()?;

    let Some(fields) = store.hgetall(&key)? else {
        return Err(CfgError::UserError(format!("record '{}' not found", key)));
    };
    let ttl = store.ttl(&key)?;

    println!("{} ({})", key, format_ttl(ttl));
    for (field, value) in &fields {
        println!("  {}: {}", field, value);
    }
    Ok(())
}

/// Human-readable TTL status.
pub fn format_ttl(ttl: Ttl) -> String {
    match ttl {
        Ttl::Missing => "missing".to_string(),
        Ttl::Persistent => "no expiry".to_string(),
        Ttl::Expires(remaining) => format!("expires in {}", format_remaining(remaining)),
    }
}

fn format_remaining(remaining: Duration) -> String {
    format!("{:.1}s", remaining.as_secs_f64())
}

fn record_key(table: &str, record: &str) -> Result<String> {
    if table.is_empty() || record.is_empty() {
        return Err(CfgError::UserError(
            "table and record names must be non-empty".to_string(),
        ));
    }
    if table.contains(KEY_SEPARATOR) {
        return Err(CfgError::UserError(format!(
            "table name '{}' must not contain '{}'",
            table, KEY_SEPARATOR
        )));
    }
    Ok(compose_key(table, record))
}

fn parse_pairs(pairs: &[String]) -> Result<Fields> {
    let mut fields = Fields::new();
    for pair in pairs {
        let Some((field, value)) = pair.split_once('=') else {
            return Err(CfgError::UserError(format!(
                "invalid field '{}': expected FIELD=VALUE",
                pair
            )));
        };
        if field.is_empty() {
            return Err(CfgError::UserError(format!(
                "invalid field '{}': field name is empty",
                pair
            )));
        }
        fields.insert(field.to_string(), value.to_string());
    }
    Ok(fields)
}
