//! Save domain types, events, and errors.
//!
//! This module contains pure data types for the save pipeline. No I/O,
//! platform, or runtime dependencies beyond the one-shot completion channel.
//!
//! # Structure
//!
//! - `types` - identifiers, requests, targets and outcomes
//! - `events` - notifications emitted to the host layer (`SaveEvent`)
//! - `errors` - the failure taxonomy (`SaveError`)

pub mod errors;
pub mod events;
pub mod types;

// Re-export commonly used types
pub use errors::SaveError;
pub use events::SaveEvent;
pub use types::{
    DownloadRequest, DownloadsLocation, PendingSave, PickerResult, PlatformCapability, RequestId,
    SaveOutcome, SaveReport, SavedFile, StorageTarget, TargetHandle, TargetOrigin, TargetSpec,
};
