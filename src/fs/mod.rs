//! Filesystem utilities for cfglock.
//!
//! Both the store database and saved configuration files go through
//! [`atomic_write`] so a concurrent reader never observes a partial file.

pub mod atomic;

pub use atomic::atomic_write;
