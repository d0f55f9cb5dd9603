//! Command handlers.
//!
//! Handlers are thin wrappers that:
//! 1. Parse/validate CLI-specific input
//! 2. Call the download manager or app info through `CliContext`
//! 3. Format output for the terminal

pub mod paths;
pub mod save;
pub mod store;
pub mod version;
