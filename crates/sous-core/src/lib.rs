//! Core domain types and ports for sous, a hands-free guided cooking session.
//!
//! This crate holds everything the voice, timer and session crates agree on:
//! the step model, the timer and session snapshots, the session event union,
//! the event-emitter port, settings, and the session error taxonomy.
//! It has no runtime behaviour of its own.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    PlaybackState, SessionState, SessionStatus, Step, StepSequence, TimerState,
};
pub use error::SessionError;
pub use events::SessionEvent;
pub use ports::{ChannelEmitter, NoopEmitter, SessionEventEmitter};
pub use settings::{Settings, SettingsError, SettingsUpdate, validate_settings};

// Silence unused dev-dependency warnings for crates only used by integration tests
#[cfg(test)]
use tokio_test as _;
