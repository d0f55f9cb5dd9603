//! Paths command handler.
//!
//! Displays the resolved downloads directory for diagnostics.

use savekit_core::DownloadsDirSource;

use crate::bootstrap::CliContext;

/// Print the downloads directory and where it came from, in `key = value` format.
pub fn execute(ctx: &CliContext) {
    let source = match ctx.downloads.source {
        DownloadsDirSource::Explicit => "explicit",
        DownloadsDirSource::EnvVar => "env",
        DownloadsDirSource::Platform => "platform",
        DownloadsDirSource::HomeFallback => "home",
    };
    println!("downloads_dir = {}", ctx.downloads.path.display());
    println!("downloads_dir_source = {source}");
    println!(
        "direct_write_min_os_version = {}",
        ctx.settings.direct_write_min_os_version
    );
}
