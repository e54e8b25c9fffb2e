//! Bridges timer callbacks to narration and session events.

use std::sync::Arc;

use sous_core::{SessionEvent, SessionEventEmitter, TimerState};
use sous_timer::TimerListener;
use sous_voice::VoiceCoordinator;
use sous_voice::utterance::{timer_completion, timer_reminder};
use tracing::debug;

/// [`TimerListener`] that speaks reminders and completions.
///
/// Both are queued behind whatever is being said (append mode) so a timer
/// never cuts off a step announcement.
pub struct TimerAnnouncer {
    voice: VoiceCoordinator,
    emitter: Arc<dyn SessionEventEmitter>,
    reminder_interval: u64,
}

impl TimerAnnouncer {
    /// `reminder_interval` is in seconds remaining; 60 gives one reminder
    /// per full minute.
    pub fn new(
        voice: VoiceCoordinator,
        emitter: Arc<dyn SessionEventEmitter>,
        reminder_interval: u64,
    ) -> Self {
        Self {
            voice,
            emitter,
            reminder_interval,
        }
    }
}

impl TimerListener for TimerAnnouncer {
    fn on_tick(&self, timer: &TimerState) {
        self.emitter.emit(SessionEvent::TimerTick {
            timer: timer.clone(),
        });

        if timer.is_reminder_boundary(self.reminder_interval) {
            debug!(
                step_number = timer.step_number,
                remaining_seconds = timer.remaining_seconds,
                "Timer reminder"
            );
            self.voice
                .speak_next(timer_reminder(&timer.label, timer.remaining_seconds));
            self.emitter.emit(SessionEvent::TimerReminder {
                step_number: timer.step_number,
                remaining_seconds: timer.remaining_seconds,
            });
        }
    }

    fn on_complete(&self, timer: &TimerState) {
        self.voice.speak_next(timer_completion(&timer.label));
        self.emitter.emit(SessionEvent::TimerCompleted {
            step_number: timer.step_number,
            label: timer.label.clone(),
        });
    }
}
