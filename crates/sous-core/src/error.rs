//! Session error taxonomy.

use thiserror::Error;

/// Errors surfaced by the session layer.
///
/// Only the load-time variants are ever returned to the presentation layer
/// as a terminal error; the rest are absorbed where they occur.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `initialize` was called with no steps.
    #[error("Recipe has no steps")]
    EmptySequence,

    /// Two steps share the same number.
    #[error("Step number {0} appears more than once")]
    DuplicateStepNumber(u32),

    /// `go_to_step` was given a number that is not in the sequence.
    #[error("Step {0} not found")]
    StepNotFound(u32),

    /// A command needing a loaded sequence ran before `initialize`.
    #[error("Session has not been initialized")]
    NotInitialized,

    /// The session was released; it accepts no further work.
    #[error("Session has been released")]
    Released,
}

impl SessionError {
    /// Whether this error ends the session (the presentation layer must
    /// show an error state rather than retry).
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::EmptySequence | Self::DuplicateStepNumber(_))
    }
}
