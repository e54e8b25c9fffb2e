//! Countdown snapshot for one step's timer.

use serde::{Deserialize, Serialize};

/// State of a single per-step countdown.
///
/// Keyed by `step_number`. The timer task mutates its own copy once per tick;
/// everything outside the timer crate only ever sees clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub step_number: u32,
    pub label: String,
    pub total_seconds: u64,
    /// Always within `0..=total_seconds`.
    pub remaining_seconds: u64,
    pub running: bool,
    pub cancelled: bool,
}

impl TimerState {
    /// A freshly started timer. Non-positive durations yield a zero-length
    /// timer that completes without ticking.
    pub fn started(step_number: u32, label: impl Into<String>, duration_seconds: i64) -> Self {
        let total = u64::try_from(duration_seconds).unwrap_or(0);
        Self {
            step_number,
            label: label.into(),
            total_seconds: total,
            remaining_seconds: total,
            running: true,
            cancelled: false,
        }
    }

    /// Fraction of the countdown elapsed, `0.0..=1.0`.
    ///
    /// A zero-length timer reports `1.0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 1.0;
        }
        let elapsed = self.total_seconds - self.remaining_seconds.min(self.total_seconds);
        elapsed as f64 / self.total_seconds as f64
    }

    pub const fn elapsed_seconds(&self) -> u64 {
        self.total_seconds.saturating_sub(self.remaining_seconds)
    }

    /// Whether `remaining_seconds` sits on a non-zero multiple of `interval`.
    pub const fn is_reminder_boundary(&self, interval: u64) -> bool {
        interval > 0 && self.remaining_seconds > 0 && self.remaining_seconds % interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_starts_full() {
        let timer = TimerState::started(2, "step 2", 120);
        assert_eq!(timer.total_seconds, 120);
        assert_eq!(timer.remaining_seconds, 120);
        assert!(timer.running);
        assert!(!timer.cancelled);
        assert!(timer.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        let timer = TimerState::started(1, "step 1", -5);
        assert_eq!(timer.total_seconds, 0);
        assert!((timer.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut timer = TimerState::started(1, "step 1", 200);
        timer.remaining_seconds = 150;
        assert!((timer.progress() - 0.25).abs() < f64::EPSILON);
        assert_eq!(timer.elapsed_seconds(), 50);
    }

    #[test]
    fn reminder_boundary_only_on_full_minutes() {
        let mut timer = TimerState::started(1, "step 1", 180);
        timer.remaining_seconds = 120;
        assert!(timer.is_reminder_boundary(60));
        timer.remaining_seconds = 119;
        assert!(!timer.is_reminder_boundary(60));
        timer.remaining_seconds = 0;
        assert!(!timer.is_reminder_boundary(60));
    }
}
