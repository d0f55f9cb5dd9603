//! Core domain types and port definitions for savekit.
//!
//! savekit persists an in-memory payload to a user-visible downloads location.
//! Depending on the platform release, that happens either through a direct,
//! permission-scoped write or through an interactive "create document"
//! picker. This crate owns everything both strategies share:
//!
//! - `save` - request, outcome, report and event types plus the error taxonomy
//! - `mime` - file name to content type resolution
//! - `ports` - trait abstractions for the platform (storage, picker, probe, app info)
//! - `settings` - save behavior configuration and validation
//! - `paths` - downloads directory resolution for desktop hosts
//!
//! No I/O happens here apart from settings loading and directory resolution.

#![deny(unused_crate_dependencies)]

pub mod mime;
pub mod paths;
pub mod ports;
pub mod save;
pub mod settings;

// Re-export commonly used types for convenience
pub use mime::{OCTET_STREAM, extension_of, resolve_mime};
pub use paths::{
    DOWNLOADS_DIR_ENV, DownloadsDirResolution, DownloadsDirSource, PathError, ensure_directory,
    resolve_downloads_dir,
};
pub use ports::{
    AppInfoPort, ChannelSaveEmitter, ContentStorePort, DocumentPickerPort, NoopSaveEmitter,
    PlatformError, PlatformProbePort, SaveEventEmitterPort, StoreListing, UNKNOWN_BUILD_VERSION,
};
pub use save::{
    DownloadRequest, DownloadsLocation, PendingSave, PickerResult, PlatformCapability, RequestId,
    SaveError, SaveEvent, SaveOutcome, SaveReport, SavedFile, StorageTarget,
    TargetHandle, TargetOrigin, TargetSpec,
};
pub use settings::{
    DEFAULT_DIRECT_WRITE_MIN_OS_VERSION, FailedWritePolicy, SaveSettings, SettingsError,
    validate_settings,
};
