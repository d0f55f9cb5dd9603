//! Port definitions (trait abstractions) for the host platform.
//!
//! Ports define the interfaces that the save pipeline expects from the
//! platform. They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No platform SDK types in any signature (URIs are [`TargetHandle`](crate::TargetHandle)s)
//! - Ports are synchronous; the only asynchronous boundary is the picker
//!   result, which the host delivers back to the manager
//! - Every port is `Send + Sync` so callbacks may arrive on any thread

pub mod app_info;
pub mod event_emitter;
pub mod platform;

pub use app_info::{AppInfoPort, StoreListing, UNKNOWN_BUILD_VERSION};
pub use event_emitter::{ChannelSaveEmitter, NoopSaveEmitter, SaveEventEmitterPort};
pub use platform::{ContentStorePort, DocumentPickerPort, PlatformError, PlatformProbePort};
