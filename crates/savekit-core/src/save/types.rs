//! Core domain types for saves.
//!
//! Pure data types; the only runtime piece is the one-shot channel behind
//! [`PendingSave`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::errors::SaveError;

/// Identifier of a single save request.
///
/// Minted by the manager for every accepted request and handed to the
/// document picker, so a picker result can only ever be paired with the
/// request that launched it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mint a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A payload to persist under a display name.
///
/// The content is shared immutably; once accepted it is written whole or
/// not at all.
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    file_name: String,
    content: Arc<[u8]>,
}

impl DownloadRequest {
    /// Create a new request.
    pub fn new(file_name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Display name, also used for content type resolution.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The exact bytes to persist.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the payload is empty. Empty payloads are valid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check the request before any platform call is made.
    pub fn validate(&self) -> Result<(), SaveError> {
        if self.file_name.trim().is_empty() {
            return Err(SaveError::invalid_request("file name must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for DownloadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("file_name", &self.file_name)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Which write strategy the running platform supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformCapability {
    /// Targets can be allocated directly in the shared downloads collection.
    DirectScopedWrite,
    /// The user must choose the destination through a document picker.
    PickerRequired,
}

impl PlatformCapability {
    /// Classify an OS version against the first release with scoped writes.
    #[must_use]
    pub const fn classify(os_version: u32, direct_write_min_os_version: u32) -> Self {
        if os_version >= direct_write_min_os_version {
            Self::DirectScopedWrite
        } else {
            Self::PickerRequired
        }
    }
}

/// Opaque, platform-issued locator of a writable location.
///
/// On device this is a content URI; desktop hosts use file paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetHandle(String);

impl TargetHandle {
    /// Wrap a platform locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Get the raw locator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a storage target was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOrigin {
    /// Allocated directly in the downloads collection, hidden until finalized.
    Scoped,
    /// Returned by the document picker.
    Picked,
}

/// A writable location, written once.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageTarget {
    handle: TargetHandle,
    origin: TargetOrigin,
}

impl StorageTarget {
    /// A target allocated in the downloads collection.
    #[must_use]
    pub const fn scoped(handle: TargetHandle) -> Self {
        Self {
            handle,
            origin: TargetOrigin::Scoped,
        }
    }

    /// A target chosen by the user through the picker.
    #[must_use]
    pub const fn picked(handle: TargetHandle) -> Self {
        Self {
            handle,
            origin: TargetOrigin::Picked,
        }
    }

    /// The platform locator.
    #[must_use]
    pub const fn handle(&self) -> &TargetHandle {
        &self.handle
    }

    /// How the target was obtained.
    #[must_use]
    pub const fn origin(&self) -> TargetOrigin {
        self.origin
    }
}

/// Name and content type used to allocate a target or filter the picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Display name of the file.
    pub display_name: String,
    /// Resolved content type.
    pub mime_type: String,
}

impl TargetSpec {
    /// Create a new spec.
    pub fn new(display_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Platform locator of the shared downloads collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadsLocation(String);

impl DownloadsLocation {
    /// Wrap a platform locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Get the raw locator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of the user's interaction with the document picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerResult {
    /// Whether the user confirmed a destination.
    pub confirmed: bool,
    /// The returned destination, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetHandle>,
}

impl PickerResult {
    /// The user picked a destination.
    #[must_use]
    pub const fn confirmed(target: TargetHandle) -> Self {
        Self {
            confirmed: true,
            target: Some(target),
        }
    }

    /// The user dismissed the picker.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            confirmed: false,
            target: None,
        }
    }

    /// The destination, only if the result was confirmed and carries one.
    #[must_use]
    pub fn into_confirmed_target(self) -> Option<TargetHandle> {
        if self.confirmed { self.target } else { None }
    }
}

/// A file that was written and made visible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFile {
    /// Display name of the file.
    pub display_name: String,
    /// Content type the file was saved with.
    pub mime_type: String,
    /// Where the file lives.
    pub handle: TargetHandle,
    /// Number of bytes written.
    pub bytes_written: u64,
}

/// Terminal result of a save, delivered through a [`PendingSave`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveReport {
    /// The payload was written.
    Succeeded {
        /// The saved file.
        file: SavedFile,
    },
    /// The save failed.
    Failed {
        /// Why it failed.
        error: SaveError,
    },
    /// The user dismissed the picker. Not an error.
    Cancelled,
}

impl SaveReport {
    /// Whether the payload was written.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Immediate result of a save call as seen by the caller.
///
/// `Pending` is returned immediately on the picker path; the final
/// [`SaveReport`] arrives through the contained handle.
#[derive(Debug)]
pub enum SaveOutcome {
    /// The payload was written and made visible.
    Succeeded(SavedFile),
    /// The save was rejected or failed.
    Failed(SaveError),
    /// Waiting for the user to pick a destination.
    Pending(PendingSave),
}

impl SaveOutcome {
    /// Short status label for logs and host responses.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
            Self::Pending(_) => "pending",
        }
    }
}

/// One-shot completion handle for a save awaiting the picker.
///
/// Fulfilled exactly once, when the picker result for `request_id` arrives.
#[derive(Debug)]
pub struct PendingSave {
    request_id: RequestId,
    completion: oneshot::Receiver<SaveReport>,
}

impl PendingSave {
    /// Pair a request with the receiving end of its completion channel.
    #[must_use]
    pub const fn new(request_id: RequestId, completion: oneshot::Receiver<SaveReport>) -> Self {
        Self {
            request_id,
            completion,
        }
    }

    /// Identifier the host must echo back with the picker result.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Wait for the terminal report.
    ///
    /// Resolves to `Failed(Abandoned)` if the manager goes away first.
    pub async fn wait(self) -> SaveReport {
        self.completion.await.unwrap_or(SaveReport::Failed {
            error: SaveError::Abandoned,
        })
    }

    /// Poll for the report without blocking.
    ///
    /// Returns `None` while the picker is still open. The report can be
    /// taken once; later calls see `Failed(Abandoned)`.
    pub fn try_report(&mut self) -> Option<SaveReport> {
        match self.completion.try_recv() {
            Ok(report) => Some(report),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(SaveReport::Failed {
                error: SaveError::Abandoned,
            }),
        }
    }
}
