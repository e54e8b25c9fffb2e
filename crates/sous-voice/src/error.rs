//! Voice coordinator error types.

/// Errors that can occur in the voice layer.
///
/// None of these reach the session controller as failures: an unavailable
/// or released coordinator turns `speak` into a no-op.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VoiceError {
    /// The speech backend failed to initialize.
    #[error("Speech backend unavailable: {0}")]
    Unavailable(String),

    /// The coordinator was released; its backend is gone.
    #[error("Voice coordinator has been released")]
    Released,

    /// The backend rejected an utterance.
    #[error("Speech backend error: {0}")]
    Backend(String),
}
