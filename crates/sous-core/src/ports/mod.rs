//! Port definitions (trait abstractions) for the session's collaborators.
//!
//! Ports define the interfaces that the session expects from the outside
//! world. They contain no transport details and use only domain types.

pub mod event_emitter;

pub use event_emitter::{ChannelEmitter, NoopEmitter, SessionEventEmitter};
