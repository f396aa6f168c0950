//! cfglock: TTL-based advisory lock around configuration save and load.
//!
//! The binary in `main.rs` is a thin wrapper over this library; integration
//! tests drive the same modules directly.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod prompt;
pub mod snapshot;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
