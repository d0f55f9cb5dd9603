//! Downloads directory resolution.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the downloads directory.
pub const DOWNLOADS_DIR_ENV: &str = "SAVEKIT_DOWNLOADS_DIR";

/// How the downloads directory was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadsDirSource {
    /// The caller passed an explicit path (CLI flag or settings file).
    Explicit,
    /// The path came from `SAVEKIT_DOWNLOADS_DIR` / `.env`.
    EnvVar,
    /// The platform's user downloads folder.
    Platform,
    /// `~/Downloads`, when the platform reports no downloads folder.
    HomeFallback,
}

/// Resolution result for the downloads directory.
#[derive(Debug, Clone)]
pub struct DownloadsDirResolution {
    /// The resolved directory.
    pub path: PathBuf,
    /// How the path was determined.
    pub source: DownloadsDirSource,
}

/// Resolve the downloads directory.
///
/// Resolution order:
/// 1. Explicit path provided by caller (highest priority)
/// 2. `SAVEKIT_DOWNLOADS_DIR` environment variable
/// 3. Platform downloads folder (e.g. `~/Downloads`, `XDG_DOWNLOAD_DIR`)
/// 4. `~/Downloads`
pub fn resolve_downloads_dir(explicit: Option<&str>) -> Result<DownloadsDirResolution, PathError> {
    resolve_downloads_dir_from(
        explicit,
        env::var(DOWNLOADS_DIR_ENV).ok(),
        dirs::download_dir(),
        dirs::home_dir(),
    )
}

/// Pure variant of [`resolve_downloads_dir`] with every input injected.
pub fn resolve_downloads_dir_from(
    explicit: Option<&str>,
    env_value: Option<String>,
    platform_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Result<DownloadsDirResolution, PathError> {
    if let Some(path_str) = explicit {
        return Ok(DownloadsDirResolution {
            path: normalize_user_path(path_str, home_dir.as_ref())?,
            source: DownloadsDirSource::Explicit,
        });
    }

    if let Some(env_path) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(DownloadsDirResolution {
            path: normalize_user_path(&env_path, home_dir.as_ref())?,
            source: DownloadsDirSource::EnvVar,
        });
    }

    if let Some(path) = platform_dir {
        return Ok(DownloadsDirResolution {
            path,
            source: DownloadsDirSource::Platform,
        });
    }

    let home = home_dir.ok_or(PathError::NoHomeDir)?;
    tracing::debug!(home = %home.display(), "No platform downloads folder, using ~/Downloads");
    Ok(DownloadsDirResolution {
        path: home.join("Downloads"),
        source: DownloadsDirSource::HomeFallback,
    })
}

/// Expand `~` and make relative paths absolute against the working directory.
fn normalize_user_path(raw: &str, home_dir: Option<&PathBuf>) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let expanded = if trimmed == "~" || trimmed.starts_with("~/") {
        let home = home_dir.ok_or(PathError::NoHomeDir)?;
        home.join(trimmed.trim_start_matches('~').trim_start_matches('/'))
    } else {
        PathBuf::from(trimmed)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(expanded))
            .map_err(|e| PathError::CurrentDirError(e.to_string()))
    }
}
