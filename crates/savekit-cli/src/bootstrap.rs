//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Settings (defaults, or a JSON file)
//! - Downloads directory resolution (via savekit-core)
//! - Filesystem platform and app info (via savekit-storage)
//! - Download manager with a channel event emitter
//!
//! Command handlers receive the composed `CliContext`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedReceiver;

use savekit_core::{
    ChannelSaveEmitter, DownloadsDirResolution, SaveEvent, SaveSettings, resolve_downloads_dir,
};
use savekit_storage::{
    DownloadManager, DownloadManagerDeps, LocalAppInfo, LocalPlatform, build_download_manager,
};

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Settings file to load instead of the defaults.
    pub settings_path: Option<PathBuf>,
    /// Downloads directory override (takes precedence over settings).
    pub downloads_dir: Option<String>,
    /// OS version the platform reports. Defaults to the direct-write minimum.
    pub os_version: Option<u32>,
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Effective settings.
    pub settings: SaveSettings,
    /// Where the downloads directory came from.
    pub downloads: DownloadsDirResolution,
    /// Filesystem platform backing every port.
    pub platform: Arc<LocalPlatform>,
    /// The download manager.
    pub manager: DownloadManager,
    /// Application identity.
    pub app_info: LocalAppInfo,
    /// Events emitted by the manager.
    pub events: UnboundedReceiver<SaveEvent>,
}

impl CliContext {
    /// Drain and return every event emitted so far.
    pub fn drain_events(&mut self) -> Vec<SaveEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Bootstrap the CLI application.
///
/// 1. Loads and validates settings
/// 2. Resolves the downloads directory
/// 3. Builds the filesystem platform and the download manager
pub fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let mut settings = match &config.settings_path {
        Some(path) => SaveSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SaveSettings::default(),
    };
    if config.downloads_dir.is_some() {
        settings = settings.with_downloads_dir(config.downloads_dir);
    }

    let downloads = resolve_downloads_dir(settings.downloads_dir.as_deref())
        .context("Failed to resolve downloads directory")?;
    tracing::debug!(
        path = %downloads.path.display(),
        source = ?downloads.source,
        "Resolved downloads directory"
    );

    let os_version = config
        .os_version
        .unwrap_or(settings.direct_write_min_os_version);
    let platform = Arc::new(LocalPlatform::new(downloads.path.clone(), os_version));

    let (emitter, events) = ChannelSaveEmitter::channel();
    let manager = build_download_manager(DownloadManagerDeps {
        probe: platform.clone(),
        store: platform.clone(),
        picker: platform.clone(),
        emitter: Arc::new(emitter),
        settings: settings.clone(),
    });

    let app_info = LocalAppInfo::new(settings.package_id.clone(), env!("CARGO_PKG_VERSION"));

    Ok(CliContext {
        settings,
        downloads,
        platform,
        manager,
        app_info,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use savekit_core::{DownloadsDirSource, PlatformCapability};

    #[test]
    fn test_bootstrap_with_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dl");
        let config = CliConfig {
            settings_path: None,
            downloads_dir: Some(dir.to_string_lossy().into_owned()),
            os_version: Some(28),
        };

        let ctx = bootstrap(config).unwrap();

        assert_eq!(ctx.downloads.path, dir);
        assert_eq!(ctx.downloads.source, DownloadsDirSource::Explicit);
        assert_eq!(ctx.manager.capability(), PlatformCapability::PickerRequired);
    }

    #[test]
    fn test_bootstrap_defaults_to_direct_write() {
        let tmp = tempfile::tempdir().unwrap();
        let config = CliConfig {
            downloads_dir: Some(tmp.path().to_string_lossy().into_owned()),
            ..CliConfig::default()
        };

        let ctx = bootstrap(config).unwrap();

        assert_eq!(ctx.manager.capability(), PlatformCapability::DirectScopedWrite);
    }

    #[test]
    fn test_bootstrap_reads_settings_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("savekit.json");
        let downloads = tmp.path().join("from-settings");
        std::fs::write(
            &path,
            format!(
                r#"{{"downloads_dir": {:?}, "package_id": "dev.savekit.demo"}}"#,
                downloads.to_string_lossy()
            ),
        )
        .unwrap();

        let ctx = bootstrap(CliConfig {
            settings_path: Some(path),
            ..CliConfig::default()
        })
        .unwrap();

        assert_eq!(ctx.downloads.path, downloads);
        assert!(ctx.app_info.store_listing().is_some());
    }
}
