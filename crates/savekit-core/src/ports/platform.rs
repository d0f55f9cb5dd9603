//! Storage, picker and version probe ports.
//!
//! These three traits are everything the download manager needs from the
//! operating system. On device they wrap the media store, the storage access
//! framework and the build version; `savekit-storage` ships a filesystem
//! implementation for desktop hosts and tests.

use std::io::{self, Write};

use thiserror::Error;

use crate::save::{DownloadsLocation, RequestId, StorageTarget, TargetHandle, TargetSpec};

/// Errors reported by platform ports.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform refused to create a storage target.
    #[error("Storage target could not be created: {0}")]
    AllocationFailed(String),

    /// The handle does not refer to a target the platform knows about.
    #[error("Unknown storage target: {0}")]
    UnknownTarget(TargetHandle),

    /// Access to the target was denied or revoked.
    #[error("Permission denied for {0}")]
    PermissionDenied(TargetHandle),

    /// The document picker could not be shown.
    #[error("Document picker unavailable: {0}")]
    PickerUnavailable(String),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Port for querying the running OS release.
pub trait PlatformProbePort: Send + Sync {
    /// Version number of the running OS (API level on device).
    fn os_version(&self) -> u32;
}

/// Port for the shared content store.
///
/// Covers both kinds of target: scoped targets allocated in the downloads
/// collection, and picked documents returned by the picker.
pub trait ContentStorePort: Send + Sync {
    /// Locator of the canonical downloads collection.
    fn canonical_downloads_location(&self) -> DownloadsLocation;

    /// Allocate a new target in `location`, tagged as pending.
    ///
    /// Pending targets are invisible to other readers until
    /// [`finalize_target`](Self::finalize_target) runs.
    fn allocate_scoped_target(
        &self,
        spec: &TargetSpec,
        location: &DownloadsLocation,
    ) -> Result<StorageTarget, PlatformError>;

    /// Clear the pending flag so the target becomes visible.
    fn finalize_target(&self, target: &StorageTarget) -> Result<(), PlatformError>;

    /// Remove a pending target without making it visible.
    fn discard_target(&self, target: &StorageTarget) -> Result<(), PlatformError>;

    /// Make a one-shot write permission on a picked document durable.
    fn persist_write_grant(&self, handle: &TargetHandle) -> Result<(), PlatformError>;

    /// Open an output channel bound to `target`, truncating existing content.
    ///
    /// The channel is closed when the returned writer is dropped.
    fn open_output(&self, target: &StorageTarget) -> io::Result<Box<dyn Write + Send>>;
}

/// Port for the platform's "create document" dialog.
pub trait DocumentPickerPort: Send + Sync {
    /// Show the dialog for `spec`, filtered to its content type.
    ///
    /// Fire-and-forget: the host delivers the user's choice later through
    /// the download manager, echoing `request_id` back.
    fn launch_create_document_dialog(
        &self,
        request_id: &RequestId,
        spec: &TargetSpec,
    ) -> Result<(), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(u32);

    impl PlatformProbePort for FixedProbe {
        fn os_version(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_probe_is_object_safe() {
        let probe: Box<dyn PlatformProbePort> = Box::new(FixedProbe(28));
        assert_eq!(probe.os_version(), 28);
    }

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::PermissionDenied(TargetHandle::new("content://docs/7"));
        assert_eq!(err.to_string(), "Permission denied for content://docs/7");

        let err: PlatformError = io::Error::new(io::ErrorKind::StorageFull, "disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
