//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for saving payloads to the downloads location.
#[derive(Parser)]
#[command(name = "savekit")]
#[command(about = "Save files to the user's downloads location")]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON)
    #[arg(long = "settings", global = true, env = "SAVEKIT_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Override the downloads directory for this invocation
    #[arg(long = "downloads-dir", global = true)]
    pub downloads_dir: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
