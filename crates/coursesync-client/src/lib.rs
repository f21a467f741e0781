//! CLI, configuration and the sync run
//!
//! This crate provides the `coursesync` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;
pub mod sync;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use sync::{SyncConfig, SyncReport, Syncer};
