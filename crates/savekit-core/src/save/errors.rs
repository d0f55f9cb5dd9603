//! Save error types.
//!
//! These errors are serializable so hosts can forward them across a plugin
//! or IPC boundary. I/O errors are captured as kind and message strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::RequestId;

/// Error type for save operations.
///
/// User cancellation is deliberately absent: a dismissed picker resolves to
/// [`SaveReport::Cancelled`](super::SaveReport::Cancelled) rather than a failure.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SaveError {
    /// The request was malformed (e.g. an empty file name).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// What was wrong with the request.
        message: String,
    },

    /// No storage target could be obtained.
    #[error("Could not allocate storage target: {message}")]
    Allocation {
        /// Detailed error message.
        message: String,
    },

    /// Opening the output channel or transferring bytes failed.
    #[error("Write failed ({kind}): {message}")]
    Write {
        /// The kind of I/O error (e.g. "`PermissionDenied`", "`StorageFull`").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// The bytes were written but the target could not be made visible.
    #[error("Could not finalize saved file: {message}")]
    Finalize {
        /// Detailed error message.
        message: String,
    },

    /// The write grant for a picked document could not be made durable.
    #[error("Could not persist write permission: {message}")]
    Grant {
        /// Detailed error message.
        message: String,
    },

    /// The document picker could not be shown.
    #[error("Could not launch document picker: {message}")]
    Launch {
        /// Detailed error message.
        message: String,
    },

    /// Another save is still in flight.
    #[error("Another save is in progress ({pending})")]
    Busy {
        /// The request currently occupying the manager.
        pending: RequestId,
    },

    /// The manager was dropped before the pending save resolved.
    #[error("Save was abandoned before completion")]
    Abandoned,
}

impl SaveError {
    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an allocation error.
    pub fn allocation(message: impl Into<String>) -> Self {
        Self::Allocation {
            message: message.into(),
        }
    }

    /// Create a write error from kind and message strings.
    pub fn write(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a write error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Write {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a finalize error.
    pub fn finalize(message: impl Into<String>) -> Self {
        Self::Finalize {
            message: message.into(),
        }
    }

    /// Create a grant error.
    pub fn grant(message: impl Into<String>) -> Self {
        Self::Grant {
            message: message.into(),
        }
    }

    /// Create a launch error.
    pub fn launch(message: impl Into<String>) -> Self {
        Self::Launch {
            message: message.into(),
        }
    }

    /// Create a busy rejection.
    #[must_use]
    pub const fn busy(pending: RequestId) -> Self {
        Self::Busy { pending }
    }

    /// Stable reason tag, matching the serialized `reason` field.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Allocation { .. } => "allocation",
            Self::Write { .. } => "write",
            Self::Finalize { .. } => "finalize",
            Self::Grant { .. } => "grant",
            Self::Launch { .. } => "launch",
            Self::Busy { .. } => "busy",
            Self::Abandoned => "abandoned",
        }
    }

    /// Check if this is a busy rejection (the request was never accepted).
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }

    /// Convert to a short user-facing message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRequest { message } => format!("Cannot save: {message}"),
            Self::Busy { .. } => "A save is already waiting for a location. Try again.".to_string(),
            Self::Abandoned => "Save was interrupted.".to_string(),
            Self::Allocation { .. }
            | Self::Write { .. }
            | Self::Finalize { .. }
            | Self::Grant { .. }
            | Self::Launch { .. } => "Save failed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "revoked");
        let err = SaveError::from_io_error(&io_err);

        match err {
            SaveError::Write { kind, message } => {
                assert_eq!(kind, "PermissionDenied");
                assert!(message.contains("revoked"));
            }
            _ => panic!("Expected Write variant"),
        }
    }

    #[test]
    fn test_reason_matches_serialized_tag() {
        let errors = [
            SaveError::allocation("insert failed"),
            SaveError::write("Other", "stream null"),
            SaveError::busy(RequestId::new()),
            SaveError::Abandoned,
        ];

        for err in errors {
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json["reason"], err.reason());
        }
    }

    #[test]
    fn test_error_roundtrip() {
        let err = SaveError::busy(RequestId::new());
        let json = serde_json::to_string(&err).unwrap();
        let parsed: SaveError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(SaveError::allocation("x").user_message(), "Save failed");
        assert!(SaveError::invalid_request("empty file name")
            .user_message()
            .contains("empty file name"));
        assert!(SaveError::busy(RequestId::new()).is_busy());
    }
}
