//! Application identity port.
//!
//! Two small collaborators that sit next to the save pipeline in the host
//! plugin: the current build number and the store listing redirect.

/// Sentinel returned when the build version cannot be read.
pub const UNKNOWN_BUILD_VERSION: i64 = -1;

/// Port for application identity lookups.
pub trait AppInfoPort: Send + Sync {
    /// Integer build identifier of the running application.
    ///
    /// Never fails: returns [`UNKNOWN_BUILD_VERSION`] when package metadata
    /// is unreadable.
    fn app_build_version(&self) -> i64;

    /// Navigate to the application's store listing.
    ///
    /// Best effort and fire-and-forget; implementations fall back to the web
    /// listing when the store app is missing and only log failures.
    fn open_store_listing(&self);
}

/// Store listing locations for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreListing {
    /// URI handled by the store app.
    pub app_uri: String,
    /// Equivalent web page, used when no store app is installed.
    pub web_url: String,
}

impl StoreListing {
    /// Build the listing locations for `package_id`.
    #[must_use]
    pub fn for_package(package_id: &str) -> Self {
        Self {
            app_uri: format!("market://details?id={package_id}"),
            web_url: format!("https://play.google.com/store/apps/details?id={package_id}"),
        }
    }
}
