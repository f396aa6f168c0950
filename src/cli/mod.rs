//! CLI argument parsing for cfglock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// cfglock: save and load a shared configuration store under a TTL lock.
///
/// Only one process at a time may save or load:
/// - the lock expires on its own if the holder dies
/// - it is renewed while the operator answers a prompt
/// - a lock left without an expiry is armed and reclaimed
#[derive(Parser, Debug)]
#[command(name = "cfglock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store directory (defaults to $CFGLOCK_DB_DIR, then ./.cfgdb).
    #[arg(long, global = true, value_name = "DIR")]
    pub db: Option<PathBuf>,

    /// Log lock activity at debug level.
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for cfglock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save the current configuration to a file.
    ///
    /// Takes the configuration lock, asks before overwriting unless --yes,
    /// and writes every table except LOCK as JSON.
    Save(SaveArgs),

    /// Load configuration from a file, replacing the store contents.
    ///
    /// Takes the configuration lock and asks for confirmation unless --yes.
    /// A LOCK table in the file is ignored.
    Load(LoadArgs),

    /// Write fields of one record (no expiry).
    Set(SetArgs),

    /// Print the fields and TTL of one record.
    Get(GetArgs),

    /// Lock inspection commands.
    Lock(LockCommand),
}

/// Arguments for the `save` command.
#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// Output file (defaults to `config_file` from config.yaml).
    pub file: Option<PathBuf>,

    /// Do not ask before overwriting.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `load` command.
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Input file (defaults to `config_file` from config.yaml).
    pub file: Option<PathBuf>,

    /// Do not ask for confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `set` command.
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Table name (e.g., PORT).
    pub table: String,

    /// Record name within the table (e.g., Ethernet0).
    pub record: String,

    /// Fields to write, as FIELD=VALUE.
    #[arg(required = true, value_name = "FIELD=VALUE")]
    pub pairs: Vec<String>,
}

/// Arguments for the `get` command.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Table name.
    pub table: String,

    /// Record name within the table.
    pub record: String,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show the configuration lock holder and remaining TTL.
    Show,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_save_minimal() {
        let cli = Cli::try_parse_from(["cfglock", "save"]).unwrap();
        assert!(cli.db.is_none());
        assert!(!cli.verbose);
        if let Command::Save(args) = cli.command {
            assert!(args.file.is_none());
            assert!(!args.yes);
        } else {
            panic!("Expected Save command");
        }
    }

    #[test]
    fn parse_save_full() {
        let cli = Cli::try_parse_from([
            "cfglock",
            "--db",
            "/var/lib/cfgdb",
            "save",
            "/tmp/out.json",
            "-y",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/var/lib/cfgdb")));
        if let Command::Save(args) = cli.command {
            assert_eq!(args.file, Some(PathBuf::from("/tmp/out.json")));
            assert!(args.yes);
        } else {
            panic!("Expected Save command");
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["cfglock", "load", "in.json", "--yes", "-v", "--db", "db"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("db")));
        if let Command::Load(args) = cli.command {
            assert_eq!(args.file, Some(PathBuf::from("in.json")));
            assert!(args.yes);
        } else {
            panic!("Expected Load command");
        }
    }

    #[test]
    fn parse_set() {
        let cli =
            Cli::try_parse_from(["cfglock", "set", "PORT", "Ethernet0", "mtu=9100", "speed=100000"])
                .unwrap();
        if let Command::Set(args) = cli.command {
            assert_eq!(args.table, "PORT");
            assert_eq!(args.record, "Ethernet0");
            assert_eq!(args.pairs, vec!["mtu=9100", "speed=100000"]);
        } else {
            panic!("Expected Set command");
        }
    }

    #[test]
    fn parse_set_requires_pairs() {
        assert!(Cli::try_parse_from(["cfglock", "set", "PORT", "Ethernet0"]).is_err());
    }

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from(["cfglock", "get", "LOCK", "configDbLock"]).unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.table, "LOCK");
            assert_eq!(args.record, "configDbLock");
        } else {
            panic!("Expected Get command");
        }
    }

    #[test]
    fn parse_lock_show() {
        let cli = Cli::try_parse_from(["cfglock", "lock", "show"]).unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            assert!(matches!(lock_cmd.action, LockAction::Show));
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_unknown_command_fails() {
        assert!(Cli::try_parse_from(["cfglock", "claim"]).is_err());
    }
}
