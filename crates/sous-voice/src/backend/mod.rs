//! Speech backend port: the engine-agnostic interface the coordinator drives.
//!
//! A backend turns one utterance at a time into audio. It never queues:
//! queueing, flushing and state tracking belong to the
//! [`VoiceCoordinator`](crate::coordinator::VoiceCoordinator). Lifecycle
//! reports travel back as [`BackendEvent`]s over a channel created with
//! [`event_channel`], and the coordinator consumes them on its own pump task.
//!
//! ## Backend implementations
//!
//! | Module      | Output                                      |
//! |-------------|---------------------------------------------|
//! | [`console`] | Prints text to stdout, simulates speech time |

pub mod console;

use std::fmt;

use tokio::sync::mpsc;

use crate::error::VoiceError;

// ── Shared types ───────────────────────────────────────────────────

/// Identifies one utterance handed to a backend.
///
/// Events carrying an id other than the coordinator's current utterance are
/// stale (the utterance was flushed) and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// Lifecycle report from a speech backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Audio for the utterance started.
    Started(UtteranceId),
    /// The utterance finished playing.
    Done(UtteranceId),
    /// The utterance was cut short by [`SpeechBackend::stop`].
    Stopped(UtteranceId),
    /// The backend failed while producing the utterance.
    Error(UtteranceId, String),
}

impl BackendEvent {
    pub const fn utterance(&self) -> UtteranceId {
        match self {
            Self::Started(id) | Self::Done(id) | Self::Stopped(id) | Self::Error(id, _) => *id,
        }
    }
}

/// Sending half handed to a backend at construction.
pub type BackendEventSender = mpsc::UnboundedSender<BackendEvent>;

/// Receiving half handed to the coordinator.
pub type BackendEventReceiver = mpsc::UnboundedReceiver<BackendEvent>;

/// Create the channel a backend reports lifecycle events on.
pub fn event_channel() -> (BackendEventSender, BackendEventReceiver) {
    mpsc::unbounded_channel()
}

// ── Backend trait ──────────────────────────────────────────────────

/// Backend-agnostic speech output.
///
/// Implementations must be `Send + Sync`: the coordinator calls them from
/// the control context and from timer tasks, always under its own lock, so
/// calls never overlap. Every method except `initialize` must return
/// promptly; audio is produced asynchronously and reported through events.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Prepare the engine. A failure leaves the coordinator unavailable.
    async fn initialize(&self) -> Result<(), VoiceError>;

    /// Start speaking `text`, abandoning any audio still playing.
    ///
    /// Must report `Started` and then exactly one of `Done`, `Stopped` or
    /// `Error` for `id`.
    fn speak(&self, id: UtteranceId, text: &str) -> Result<(), VoiceError>;

    /// Halt audio output immediately.
    fn stop(&self);

    /// Release engine resources. No events are reported afterwards.
    fn shutdown(&self);
}
