//! Downloads directory resolution for desktop hosts.
//!
//! On device the downloads collection is owned by the platform. Desktop
//! hosts (the CLI, tests) back it with a plain directory resolved here.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Environment and platform lookups are injected into a pure resolver so
//!   the resolution order is testable without touching the process env

mod downloads;
mod ensure;
mod error;

pub use downloads::{
    DOWNLOADS_DIR_ENV, DownloadsDirResolution, DownloadsDirSource, resolve_downloads_dir,
    resolve_downloads_dir_from,
};
pub use ensure::ensure_directory;
pub use error::PathError;
