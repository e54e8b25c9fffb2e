//! Timer subsystem errors.

/// Errors returned by [`TimerManager`](crate::TimerManager) commands.
///
/// Cancellation is not an error: a cancelled timer simply never completes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The manager was shut down; no new timers start.
    #[error("Timer manager has been shut down")]
    ShutDown,

    /// `start` was called outside a tokio runtime.
    #[error("No async runtime available to run timer for step {0}")]
    NoRuntime(u32),
}
