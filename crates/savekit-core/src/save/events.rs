//! Save events - discriminated union of everything the host layer is told.
//!
//! The webview side handles this as a tagged union:
//!
//! ```typescript
//! type SaveEvent =
//!   | { type: "picker_launched"; request_id: string; display_name: string; mime_type: string }
//!   | { type: "save_succeeded"; request_id?: string; file: SavedFile }
//!   | { type: "save_failed"; request_id?: string; display_name: string; error: SaveError }
//!   | { type: "save_cancelled"; request_id: string };
//! ```
//!
//! `request_id` is absent for direct writes, which complete inside the call.

use serde::{Deserialize, Serialize};

use super::errors::SaveError;
use super::types::{RequestId, SavedFile, TargetSpec};

/// Event emitted by the download manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SaveEvent {
    /// The document picker was shown for a request.
    PickerLaunched {
        request_id: RequestId,
        display_name: String,
        mime_type: String,
    },
    /// A payload was written and made visible.
    SaveSucceeded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
        file: SavedFile,
    },
    /// A save failed after being accepted.
    SaveFailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
        display_name: String,
        error: SaveError,
    },
    /// The user dismissed the picker (only emitted when configured).
    SaveCancelled { request_id: RequestId },
}

impl SaveEvent {
    /// Create a picker launched event.
    #[must_use]
    pub fn picker_launched(request_id: RequestId, spec: &TargetSpec) -> Self {
        Self::PickerLaunched {
            request_id,
            display_name: spec.display_name.clone(),
            mime_type: spec.mime_type.clone(),
        }
    }

    /// Create a success event.
    #[must_use]
    pub const fn succeeded(request_id: Option<RequestId>, file: SavedFile) -> Self {
        Self::SaveSucceeded { request_id, file }
    }

    /// Create a failure event.
    pub fn failed(
        request_id: Option<RequestId>,
        display_name: impl Into<String>,
        error: SaveError,
    ) -> Self {
        Self::SaveFailed {
            request_id,
            display_name: display_name.into(),
            error,
        }
    }

    /// Create a cancellation event.
    #[must_use]
    pub const fn cancelled(request_id: RequestId) -> Self {
        Self::SaveCancelled { request_id }
    }

    /// Get the request ID, if the event belongs to a picker request.
    #[must_use]
    pub const fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::PickerLaunched { request_id, .. } | Self::SaveCancelled { request_id } => {
                Some(*request_id)
            }
            Self::SaveSucceeded { request_id, .. } | Self::SaveFailed { request_id, .. } => {
                *request_id
            }
        }
    }

    /// Check if this event ends a save.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::PickerLaunched { .. })
    }

    /// Event name for host-side dispatch.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::PickerLaunched { .. } => "save:picker-launched",
            Self::SaveSucceeded { .. } => "save:succeeded",
            Self::SaveFailed { .. } => "save:failed",
            Self::SaveCancelled { .. } => "save:cancelled",
        }
    }
}
