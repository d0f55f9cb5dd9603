//! Version command handler.

use savekit_core::{AppInfoPort, UNKNOWN_BUILD_VERSION};

use crate::bootstrap::CliContext;

/// Print the integer build version, or -1 when it cannot be determined.
pub fn execute(ctx: &CliContext) -> i64 {
    let version = ctx.app_info.app_build_version();
    if version == UNKNOWN_BUILD_VERSION {
        tracing::warn!("Build version unavailable");
    }
    println!("{version}");
    version
}
