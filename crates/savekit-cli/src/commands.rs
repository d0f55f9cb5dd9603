//! Main commands enum.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Save a file to the downloads location
    Save {
        /// File whose contents are saved
        input: PathBuf,
        /// Display name of the saved file (defaults to the input file name)
        #[arg(short, long)]
        name: Option<String>,
        /// OS version to report; below the direct-write minimum the picker is used
        #[arg(long)]
        os_version: Option<u32>,
        /// Destination chosen in the picker; omit to cancel the dialog
        #[arg(long)]
        pick: Option<PathBuf>,
    },

    /// Print the application build version
    Version,

    /// Open the application's store listing
    Store,

    /// Show the resolved downloads directory
    Paths,
}
