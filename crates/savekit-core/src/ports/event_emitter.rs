//! Save event emitter port.
//!
//! This port abstracts event emission, allowing the download manager to
//! report results without coupling to the transport (plugin channel, IPC,
//! CLI output).

use tokio::sync::mpsc;

use crate::save::SaveEvent;

/// Port for emitting save events.
///
/// Implementations must not block; the manager emits from whatever thread
/// delivered the picker result.
pub trait SaveEventEmitterPort: Send + Sync {
    /// Emit a save event.
    fn emit(&self, event: SaveEvent);
}

/// A no-op emitter for tests and hosts that only use completion handles.
#[derive(Debug, Clone, Default)]
pub struct NoopSaveEmitter;

impl NoopSaveEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SaveEventEmitterPort for NoopSaveEmitter {
    fn emit(&self, _event: SaveEvent) {}
}

/// Emitter that forwards events into an unbounded channel.
///
/// Hosts bridge the receiving end to their own event system.
#[derive(Debug, Clone)]
pub struct ChannelSaveEmitter {
    tx: mpsc::UnboundedSender<SaveEvent>,
}

impl ChannelSaveEmitter {
    /// Create an emitter and the receiver for its events.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SaveEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SaveEventEmitterPort for ChannelSaveEmitter {
    fn emit(&self, event: SaveEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Save event dropped: receiver closed");
        }
    }
}
