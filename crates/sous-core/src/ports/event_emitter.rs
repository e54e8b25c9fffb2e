//! Event emitter trait for session change notifications.
//!
//! This module defines the abstraction for emitting session events.
//! Implementations handle transport details (channels, UI bridges, etc.).

use tokio::sync::mpsc;

use crate::events::SessionEvent;

/// Trait for emitting session events.
///
/// Called from the control context and from timer tasks, so implementations
/// must be `Send + Sync` and must not block.
///
/// # Implementations
///
/// - [`NoopEmitter`] - For tests and contexts without a listener
/// - [`ChannelEmitter`] - Forwards into an unbounded tokio channel
pub trait SessionEventEmitter: Send + Sync {
    /// Emit a session event.
    fn emit(&self, event: SessionEvent);

    /// Clone this emitter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn SessionEventEmitter>;
}

/// A no-op event emitter that discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl SessionEventEmitter for NoopEmitter {
    fn emit(&self, _event: SessionEvent) {}

    fn clone_box(&self) -> Box<dyn SessionEventEmitter> {
        Box::new(self.clone())
    }
}

/// Emitter backed by an unbounded tokio channel.
///
/// Sending never blocks. If the receiver is gone the event is dropped and a
/// warning is logged.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionEventEmitter for ChannelEmitter {
    fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Session event receiver dropped");
        }
    }

    fn clone_box(&self) -> Box<dyn SessionEventEmitter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn noop_emitter_accepts_events() {
        let emitter = NoopEmitter::new();
        emitter.emit(SessionEvent::SessionCompleted);
    }

    #[test]
    fn emitter_is_object_safe() {
        let emitter: Arc<dyn SessionEventEmitter> = Arc::new(NoopEmitter::new());
        let boxed = emitter.clone_box();
        boxed.emit(SessionEvent::SessionCompleted);
    }

    #[tokio::test]
    async fn channel_emitter_forwards_in_order() {
        let (emitter, mut rx) = ChannelEmitter::new();
        emitter.emit(SessionEvent::step_changed(1, 0, 3));
        emitter.emit(SessionEvent::SessionCompleted);

        assert_eq!(rx.recv().await, Some(SessionEvent::step_changed(1, 0, 3)));
        assert_eq!(rx.recv().await, Some(SessionEvent::SessionCompleted));
    }

    #[test]
    fn channel_emitter_survives_dropped_receiver() {
        let (emitter, rx) = ChannelEmitter::new();
        drop(rx);
        emitter.emit(SessionEvent::SessionCompleted);
    }
}
