//! Configuration model for cfglock.
//!
//! This module defines the Config struct that represents `config.yaml` in the
//! store directory. Unknown fields are ignored, every field has a default, and
//! values are validated on load.

mod model;
mod operations;


pub use model::Config;
