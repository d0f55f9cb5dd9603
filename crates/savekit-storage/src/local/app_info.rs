//! Application identity for desktop hosts.

use savekit_core::{AppInfoPort, StoreListing, UNKNOWN_BUILD_VERSION};

/// Derive an integer build code from a `major.minor.patch` version string.
///
/// `1.4.2` becomes `10402`. Returns `None` for anything that is not three
/// dot-separated numbers (a pre-release suffix on the patch is ignored).
pub fn build_version_from_semver(version: &str) -> Option<i64> {
    let mut parts = version.trim().trim_start_matches('v').splitn(3, '.');
    let major: i64 = parts.next()?.parse().ok()?;
    let minor: i64 = parts.next()?.parse().ok()?;
    let patch_raw = parts.next()?;
    let patch_digits = patch_raw
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();
    let patch: i64 = patch_digits.parse().ok()?;

    if minor > 99 || patch > 99 {
        return None;
    }
    Some(major * 10_000 + minor * 100 + patch)
}

/// App identity backed by a package id and the crate version.
#[derive(Debug, Clone)]
pub struct LocalAppInfo {
    package_id: Option<String>,
    version: String,
}

impl LocalAppInfo {
    /// Create app info for `package_id` at `version`.
    pub fn new(package_id: Option<String>, version: impl Into<String>) -> Self {
        Self {
            package_id,
            version: version.into(),
        }
    }

    /// Store listing for the configured package, if any.
    pub fn store_listing(&self) -> Option<StoreListing> {
        self.package_id.as_deref().map(StoreListing::for_package)
    }
}

impl AppInfoPort for LocalAppInfo {
    fn app_build_version(&self) -> i64 {
        build_version_from_semver(&self.version).unwrap_or_else(|| {
            tracing::warn!(version = %self.version, "Unreadable application version");
            UNKNOWN_BUILD_VERSION
        })
    }

    fn open_store_listing(&self) {
        let Some(listing) = self.store_listing() else {
            tracing::warn!("No package id configured; cannot open store listing");
            return;
        };

        if let Err(e) = open::that(&listing.app_uri) {
            tracing::debug!(uri = %listing.app_uri, error = %e, "Store app unavailable, using web listing");
            if let Err(e) = open::that(&listing.web_url) {
                tracing::warn!(url = %listing.web_url, error = %e, "Failed to open store listing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_version_from_semver() {
        assert_eq!(build_version_from_semver("0.3.1"), Some(301));
        assert_eq!(build_version_from_semver("v1.4.2"), Some(10_402));
        assert_eq!(build_version_from_semver("2.0.7-beta.1"), Some(20_007));
        assert_eq!(build_version_from_semver("1.2"), None);
        assert_eq!(build_version_from_semver("1.100.0"), None);
        assert_eq!(build_version_from_semver("garbage"), None);
    }

    #[test]
    fn test_unreadable_version_is_sentinel() {
        let info = LocalAppInfo::new(None, "unknown");
        assert_eq!(info.app_build_version(), UNKNOWN_BUILD_VERSION);
        assert_eq!(LocalAppInfo::new(None, "1.0.0").app_build_version(), 10_000);
    }

    #[test]
    fn test_store_listing_requires_package() {
        assert!(LocalAppInfo::new(None, "1.0.0").store_listing().is_none());
        let listing = LocalAppInfo::new(Some("dev.savekit.demo".into()), "1.0.0")
            .store_listing()
            .unwrap();
        assert_eq!(listing.app_uri, "market://details?id=dev.savekit.demo");
    }
}
