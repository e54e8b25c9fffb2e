//! Callback port invoked by timer tasks.

use sous_core::TimerState;

/// Receives tick and completion callbacks from running timers.
///
/// Callbacks run on the timer's own task, one at a time per timer, in tick
/// order; `on_complete` always comes after the last `on_tick`. Different
/// timers call concurrently and in no particular order.
///
/// Callbacks must return promptly and must not cancel the timer that is
/// calling them (cancellation waits for in-flight callbacks to finish).
pub trait TimerListener: Send + Sync {
    /// One interval elapsed; `timer.remaining_seconds` was just decremented.
    fn on_tick(&self, timer: &TimerState);

    /// The countdown reached zero without being cancelled.
    fn on_complete(&self, timer: &TimerState);
}

/// Listener that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl TimerListener for NoopListener {
    fn on_tick(&self, _timer: &TimerState) {}

    fn on_complete(&self, _timer: &TimerState) {}
}
