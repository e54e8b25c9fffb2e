//! Session snapshot handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::step::{Step, StepSequence};
use super::timer::TimerState;

/// Voice playback state, mirrored from the voice coordinator.
///
/// ```text
///   Idle → Announcing → Speaking → Idle
///                          ⇅
///                        Paused
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing requested or playing.
    #[default]
    Idle,

    /// Text handed to the backend; audio has not started yet.
    Announcing,

    /// Backend reported that audio started.
    Speaking,

    /// Output halted; the current text is kept for resume.
    Paused,
}

impl PlaybackState {
    /// Whether an utterance is requested or audible.
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Announcing | Self::Speaking)
    }

    pub const fn is_speaking(self) -> bool {
        matches!(self, Self::Speaking)
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// `initialize` has not succeeded yet.
    #[default]
    NotStarted,
    Active,
    /// Reached only through an explicit stop.
    Completed,
    /// `initialize` was rejected; the presentation layer shows an error.
    Failed,
}

/// Immutable snapshot of a session, rebuilt after every command.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub sequence: Option<StepSequence>,
    pub current_index: usize,
    pub playback: PlaybackState,
    pub active_timers: Vec<TimerState>,
    pub status: SessionStatus,
    pub released: bool,
}

impl SessionState {
    pub fn current_step(&self) -> Option<&Step> {
        self.sequence.as_ref()?.get(self.current_index)
    }

    pub fn total_steps(&self) -> usize {
        self.sequence.as_ref().map_or(0, StepSequence::len)
    }

    /// 1-based position of the current step, or 0 before initialization.
    pub fn progress(&self) -> usize {
        if self.sequence.is_some() {
            self.current_index + 1
        } else {
            0
        }
    }

    pub const fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub const fn is_speaking(&self) -> bool {
        self.playback.is_speaking()
    }

    pub fn timer_for(&self, step_number: u32) -> Option<&TimerState> {
        self.active_timers
            .iter()
            .find(|t| t.step_number == step_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_has_no_progress() {
        let state = SessionState::default();
        assert_eq!(state.status, SessionStatus::NotStarted);
        assert_eq!(state.progress(), 0);
        assert_eq!(state.total_steps(), 0);
        assert!(state.current_step().is_none());
    }

    #[test]
    fn progress_is_one_based() {
        let sequence = StepSequence::new(vec![Step::new(1, "a"), Step::new(2, "b")]).unwrap();
        let state = SessionState {
            sequence: Some(sequence),
            current_index: 1,
            status: SessionStatus::Active,
            ..SessionState::default()
        };
        assert_eq!(state.progress(), 2);
        assert_eq!(state.current_step().map(|s| s.step_number), Some(2));
    }

    #[test]
    fn playback_flags() {
        assert!(PlaybackState::Announcing.is_playing());
        assert!(!PlaybackState::Announcing.is_speaking());
        assert!(PlaybackState::Speaking.is_speaking());
        assert!(!PlaybackState::Paused.is_playing());
        assert!(!PlaybackState::Idle.is_playing());
    }
}
