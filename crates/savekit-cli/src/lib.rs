//! Command-line adapter for savekit.
//!
//! Wires the download manager to a local downloads directory and exposes
//! `save`, `version`, `store` and `paths` commands.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs binary
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
