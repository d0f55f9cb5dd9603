//! CLI-specific error types and mappings.
//!
//! Maps save, settings and path errors to exit codes and user-facing
//! messages.

use savekit_core::{PathError, SaveError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The save was rejected or failed.
    #[error("{0}")]
    Save(#[from] SaveError),

    /// Argument error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (input not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Save(SaveError::InvalidRequest { .. }) | Self::Arguments(_) => 2, // EX_USAGE
            Self::Save(SaveError::Busy { .. }) => 75, // EX_TEMPFAIL
            Self::Save(SaveError::Abandoned) => 70,   // EX_SOFTWARE
            Self::Save(_) => 73,                      // EX_CANTCREAT
            Self::Io(_) => 74,                        // EX_IOERR
            Self::Config(_) => 78,                    // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savekit_core::RequestId;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::from(SaveError::busy(RequestId::new())).exit_code(), 75);
        assert_eq!(CliError::from(SaveError::invalid_request("empty")).exit_code(), 2);
        assert_eq!(CliError::from(SaveError::allocation("denied")).exit_code(), 73);
        assert_eq!(CliError::Config("bad".into()).exit_code(), 78);
    }

    #[test]
    fn test_save_error_message_keeps_detail() {
        let err = CliError::from(SaveError::write("StorageFull", "no space left"));
        assert_eq!(err.to_string(), "Write failed (StorageFull): no space left");
    }
}
