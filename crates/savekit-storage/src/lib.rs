//! Save pipeline for savekit.
//!
//! - `manager` - the [`DownloadManager`] state machine (direct write or picker flow)
//! - `writer` - byte transfer into a storage target
//! - `local` - filesystem platform adapter for desktop hosts and tests

#![deny(unused_crate_dependencies)]

mod manager;
mod writer;

pub mod local;

pub use local::{LaunchedDialog, LocalAppInfo, LocalPlatform, build_version_from_semver};
pub use manager::{DownloadManager, DownloadManagerDeps, ManagerState, build_download_manager};
pub use writer::StorageWriter;

// Re-export core types for convenience
pub use savekit_core::{
    DownloadRequest, PendingSave, PickerResult, RequestId, SaveError, SaveEvent, SaveOutcome,
    SaveReport, SaveSettings, SavedFile,
};
