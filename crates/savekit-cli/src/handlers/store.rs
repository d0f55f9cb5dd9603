//! Store command handler.

use savekit_core::AppInfoPort;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Open the store listing for the configured package.
///
/// Opening itself is best effort; only a missing package id is an error.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let Some(listing) = ctx.app_info.store_listing() else {
        return Err(CliError::Config(
            "package_id is not set in the settings file".to_string(),
        ));
    };

    println!("Opening {}", listing.app_uri);
    ctx.app_info.open_store_listing();
    Ok(())
}
