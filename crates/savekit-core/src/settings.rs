//! Save settings and validation.
//!
//! Pure configuration types. Hosts load them from a JSON file or build them
//! in code; every field has a default so partial files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// First OS release where downloads can be written without the picker.
pub const DEFAULT_DIRECT_WRITE_MIN_OS_VERSION: u32 = 29;

/// What happens to an allocated target when writing into it fails.
///
/// Either way the target never stays pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedWritePolicy {
    /// Clear the pending flag anyway; the partial file becomes visible.
    #[default]
    Finalize,
    /// Delete the pending target; no new file appears.
    Discard,
}

/// Save behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SaveSettings {
    /// OS versions at or above this use direct scoped writes.
    pub direct_write_min_os_version: u32,

    /// Cleanup applied to a scoped target after a failed write.
    pub failed_write_policy: FailedWritePolicy,

    /// Emit a `save_cancelled` event when the user dismisses the picker.
    ///
    /// Completion handles always resolve to `Cancelled`; this only affects
    /// the event stream, which is silent on cancellation by default.
    pub report_cancellation: bool,

    /// Downloads directory override for desktop hosts.
    pub downloads_dir: Option<String>,

    /// Store package identifier used for the listing redirect.
    pub package_id: Option<String>,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            direct_write_min_os_version: DEFAULT_DIRECT_WRITE_MIN_OS_VERSION,
            failed_write_policy: FailedWritePolicy::Finalize,
            report_cancellation: false,
            downloads_dir: None,
            package_id: None,
        }
    }
}

impl SaveSettings {
    /// Parse and validate settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Set the cleanup policy for failed writes.
    #[must_use]
    pub const fn with_failed_write_policy(mut self, policy: FailedWritePolicy) -> Self {
        self.failed_write_policy = policy;
        self
    }

    /// Set whether cancellations are emitted as events.
    #[must_use]
    pub const fn with_report_cancellation(mut self, report: bool) -> Self {
        self.report_cancellation = report;
        self
    }

    /// Set the downloads directory override.
    #[must_use]
    pub fn with_downloads_dir(mut self, dir: Option<String>) -> Self {
        self.downloads_dir = dir;
        self
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Direct write minimum OS version must be at least 1, got {0}")]
    InvalidMinOsVersion(u32),

    #[error("Downloads directory cannot be empty")]
    EmptyDownloadsDir,

    #[error("Package id cannot be empty")]
    EmptyPackageId,

    #[error("Failed to read settings file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid settings JSON: {0}")]
    Parse(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &SaveSettings) -> Result<(), SettingsError> {
    if settings.direct_write_min_os_version == 0 {
        return Err(SettingsError::InvalidMinOsVersion(
            settings.direct_write_min_os_version,
        ));
    }

    if settings
        .downloads_dir
        .as_ref()
        .is_some_and(|d| d.trim().is_empty())
    {
        return Err(SettingsError::EmptyDownloadsDir);
    }

    if settings
        .package_id
        .as_ref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(SettingsError::EmptyPackageId);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SaveSettings::default();
        assert_eq!(settings.direct_write_min_os_version, 29);
        assert_eq!(settings.failed_write_policy, FailedWritePolicy::Finalize);
        assert!(!settings.report_cancellation);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = SaveSettings::from_json_str(r#"{"failed_write_policy": "discard"}"#).unwrap();
        assert_eq!(settings.failed_write_policy, FailedWritePolicy::Discard);
        assert_eq!(
            settings.direct_write_min_os_version,
            DEFAULT_DIRECT_WRITE_MIN_OS_VERSION
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SaveSettings::from_json_str(r#"{"direct_write_min_os_version": 0}"#),
            Err(SettingsError::InvalidMinOsVersion(0))
        ));
        assert!(matches!(
            SaveSettings::from_json_str(r#"{"downloads_dir": "  "}"#),
            Err(SettingsError::EmptyDownloadsDir)
        ));
        assert!(matches!(
            SaveSettings::from_json_str(r#"{"package_id": ""}"#),
            Err(SettingsError::EmptyPackageId)
        ));
        assert!(matches!(
            SaveSettings::from_json_str("not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savekit.json");
        std::fs::write(&path, r#"{"report_cancellation": true}"#).unwrap();

        let settings = SaveSettings::load(&path).unwrap();
        assert!(settings.report_cancellation);

        let missing = SaveSettings::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SettingsError::Read { .. })));
    }
}
