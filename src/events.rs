//! Append-only audit log of configuration operations.
//!
//! Events are stored as NDJSON (one JSON object per line) in
//! `<store>/events/events.ndjson`, one line per `save`, `load` or aborted
//! attempt. Each event records:
//! - `ts`: RFC3339 timestamp
//! - `action`: `save`, `load` or `abort`
//! - `actor`: `user@HOST`
//! - `pid`: process id of the invocation
//! - `details`: freeform object (file, table count, abort reason)

use crate::context::StoreContext;
use crate::error::{CfgError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Configuration written to a file.
    Save,
    /// Configuration loaded from a file into the store.
    Load,
    /// A save or load gave up without touching the configuration.
    Abort,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Save => write!(f, "save"),
            EventAction::Load => write!(f, "load"),
            EventAction::Abort => write!(f, "abort"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// When the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// Who performed it (`user@HOST`).
    pub actor: String,

    /// Process id of the invocation.
    pub pid: u32,

    /// Action-specific details.
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time, actor and pid.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            pid: std::process::id(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CfgError::UserError(format!("failed to serialize event to JSON: {}", e)))
    }
}

fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Path to the events file.
pub fn events_file_path(ctx: &StoreContext) -> PathBuf {
    ctx.events_dir().join("events.ndjson")
}

/// Append an event to the audit log, creating the file if needed.
pub fn append_event(ctx: &StoreContext, event: &Event) -> Result<()> {
    let events_file = events_file_path(ctx);
    let json_line = event.to_ndjson_line()?;

    let events_dir = ctx.events_dir();
    if !events_dir.exists() {
        fs::create_dir_all(&events_dir).map_err(|e| {
            CfgError::UserError(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    // O_APPEND keeps lines from concurrent processes whole.
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            CfgError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        CfgError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read every event back, oldest first.
pub fn read_events(ctx: &StoreContext) -> Result<Vec<Event>> {
    let events_file = events_file_path(ctx);
    let content = match fs::read_to_string(&events_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CfgError::UserError(format!(
                "failed to read events file '{}': {}",
                events_file.display(),
                e
            )));
        }
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line)
                .map_err(|e| CfgError::UserError(format!("failed to parse event: {}", e)))
        })
        .collect()
}
