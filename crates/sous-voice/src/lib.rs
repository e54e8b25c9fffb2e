//! Voice layer for sous: one serialized narration channel over a pluggable
//! speech backend.
//!
//! - [`coordinator`]: the [`VoiceCoordinator`] state machine (flush/append,
//!   pause/resume, stop/release).
//! - [`backend`]: the [`SpeechBackend`] port, its lifecycle events, and a
//!   console implementation.
//! - [`utterance`]: the sentences spoken for steps and timers.

#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod utterance;

// Re-export key types for convenience
pub use backend::console::ConsoleBackend;
pub use backend::{BackendEvent, BackendEventSender, SpeechBackend, UtteranceId, event_channel};
pub use coordinator::{VoiceCoordinator, VoiceStatus};
pub use error::VoiceError;
pub use utterance::AnnouncementOptions;

#[cfg(test)]
use tokio_test as _;
