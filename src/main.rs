//! cfglock: save and load a shared configuration store under a TTL lock.
//!
//! This is the main entry point for the `cfglock` CLI. It parses arguments,
//! sets up logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

use cfglock::cli::Cli;
use cfglock::error::CfgError;
use cfglock::{commands, exit_codes};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    // RUST_LOG wins over -v.
    let default_directive = if verbose { "cfglock=debug" } else { "cfglock=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    match commands::dispatch(cli.db.as_deref(), cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(CfgError::Aborted) => {
            eprintln!("{}", CfgError::Aborted);
            ExitCode::from(CfgError::Aborted.exit_code() as u8)
        }
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
