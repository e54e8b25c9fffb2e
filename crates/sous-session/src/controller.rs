//! The session controller: step position plus orchestration of voice and
//! timers.
//!
//! The controller never speaks or counts down itself. It calls into the
//! [`VoiceCoordinator`] and [`TimerManager`] and rebuilds a
//! [`SessionState`] snapshot from them on request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sous_core::{
    PlaybackState, SessionError, SessionEvent, SessionEventEmitter, SessionState, SessionStatus,
    Step, StepSequence, TimerState,
};
use sous_timer::TimerManager;
use sous_voice::utterance::step_announcement;
use sous_voice::{AnnouncementOptions, VoiceCoordinator};
use tracing::{debug, info, warn};

/// A timer stopped with `toggle_timer`, resumable from where it left off.
#[derive(Debug, Clone)]
struct PausedTimer {
    remaining_seconds: u64,
    label: String,
}

#[derive(Debug, Default)]
struct Position {
    sequence: Option<StepSequence>,
    current_index: usize,
    status: SessionStatus,
    released: bool,
    paused_timers: HashMap<u32, PausedTimer>,
}

impl Position {
    fn active_sequence(&self) -> Option<&StepSequence> {
        match self.status {
            SessionStatus::Active => self.sequence.as_ref(),
            _ => None,
        }
    }
}

/// Single source of truth for a guided cooking session.
///
/// Commands are synchronous and expected to come from one control context.
/// Commands that start timers need a tokio runtime.
pub struct SessionController {
    voice: VoiceCoordinator,
    timers: TimerManager,
    emitter: Arc<dyn SessionEventEmitter>,
    options: AnnouncementOptions,
    position: Mutex<Position>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("timers", &self.timers)
            .field("position", &self.lock())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(
        voice: VoiceCoordinator,
        timers: TimerManager,
        emitter: Arc<dyn SessionEventEmitter>,
        options: AnnouncementOptions,
    ) -> Self {
        Self {
            voice,
            timers,
            emitter,
            options,
            position: Mutex::new(Position::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Position> {
        self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Load `steps` (in any order) and move to the first one.
    ///
    /// Does not announce; call [`announce_current_step`](Self::announce_current_step)
    /// when the presentation layer is ready. Re-initializing silences the
    /// previous session's voice and timers.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptySequence`] or [`SessionError::DuplicateStepNumber`]
    /// leave the session in the `Failed` state. [`SessionError::Released`]
    /// after [`release`](Self::release).
    pub fn initialize(&self, steps: Vec<Step>) -> Result<(), SessionError> {
        let mut position = self.lock();
        if position.released {
            return Err(SessionError::Released);
        }

        if position.status == SessionStatus::Active {
            self.voice.stop();
            self.cancel_timers();
        }
        position.paused_timers.clear();

        match StepSequence::new(steps) {
            Ok(sequence) => {
                let first = sequence.get(0).map_or(0, |s| s.step_number);
                let total = sequence.len();
                position.sequence = Some(sequence);
                position.current_index = 0;
                position.status = SessionStatus::Active;
                drop(position);

                info!(total_steps = total, "Session initialized");
                self.emitter
                    .emit(SessionEvent::step_changed(first, 0, total));
                Ok(())
            }
            Err(e) => {
                position.sequence = None;
                position.current_index = 0;
                position.status = SessionStatus::Failed;
                drop(position);

                warn!(error = %e, "Rejected step sequence");
                self.emitter.emit(SessionEvent::SessionFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Stop narration and cancel every timer. The session ends in the
    /// `Completed` state; navigation becomes a no-op until re-initialized.
    pub fn stop(&self) {
        let mut position = self.lock();
        self.voice.stop();
        self.cancel_timers();
        position.paused_timers.clear();

        if position.status == SessionStatus::Active {
            position.status = SessionStatus::Completed;
            drop(position);
            info!("Session stopped");
            self.emitter.emit(SessionEvent::SessionCompleted);
        }
    }

    /// [`stop`](Self::stop), then free the voice backend and shut the timer
    /// subsystem down. Safe to call any number of times.
    pub fn release(&self) {
        if self.lock().released {
            return;
        }
        self.stop();
        self.lock().released = true;
        self.voice.release();
        self.timers.shutdown();
        info!("Session released");
    }

    // ── Navigation ─────────────────────────────────────────────────

    /// Move forward one step and announce it. `false` at the last step.
    pub fn next_step(&self) -> bool {
        self.move_by(1)
    }

    /// Move back one step and announce it. `false` at the first step.
    pub fn previous_step(&self) -> bool {
        self.move_by(-1)
    }

    fn move_by(&self, delta: isize) -> bool {
        let moved = {
            let mut position = self.lock();
            let Some(len) = position.active_sequence().map(StepSequence::len) else {
                return false;
            };
            match position.current_index.checked_add_signed(delta) {
                Some(target) if target < len => {
                    position.current_index = target;
                    true
                }
                _ => false,
            }
        };

        if moved {
            self.step_changed();
        }
        moved
    }

    /// Jump to the step numbered `step_number` and announce it.
    ///
    /// Returns `Ok(false)` without changing anything when no such step
    /// exists.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotInitialized`] when no sequence is active.
    pub fn go_to_step(&self, step_number: u32) -> Result<bool, SessionError> {
        match self.locate(step_number) {
            Ok(index) => {
                self.lock().current_index = index;
                self.step_changed();
                Ok(true)
            }
            Err(e @ SessionError::StepNotFound(_)) => {
                debug!(error = %e, "Ignoring jump to unknown step");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn locate(&self, step_number: u32) -> Result<usize, SessionError> {
        let position = self.lock();
        let sequence = position
            .active_sequence()
            .ok_or(SessionError::NotInitialized)?;
        sequence
            .position_of(step_number)
            .ok_or(SessionError::StepNotFound(step_number))
    }

    fn step_changed(&self) {
        let changed = {
            let position = self.lock();
            position.active_sequence().and_then(|sequence| {
                sequence.get(position.current_index).map(|step| {
                    SessionEvent::step_changed(
                        step.step_number,
                        position.current_index,
                        sequence.len(),
                    )
                })
            })
        };
        if let Some(event) = changed {
            debug!(step_number = event.step_number(), "Step changed");
            self.emitter.emit(event);
            self.announce_current_step();
        }
    }

    // ── Narration ──────────────────────────────────────────────────

    /// Speak the current step, interrupting anything being said, and start
    /// its timer when it has a duration. `false` when nothing is active.
    pub fn announce_current_step(&self) -> bool {
        let (step, total) = {
            let position = self.lock();
            let Some(sequence) = position.active_sequence() else {
                return false;
            };
            let Some(step) = sequence.get(position.current_index) else {
                return false;
            };
            (step.clone(), sequence.len())
        };

        self.voice
            .speak(step_announcement(&step, total, self.options));

        if let Some(seconds) = step.duration_seconds {
            self.start_timer(step.step_number, seconds, step.timer_label());
        }
        true
    }

    /// Pause narration if it is playing, otherwise replay the last text.
    /// Returns the resulting playback state.
    pub fn toggle_play_pause(&self) -> PlaybackState {
        if self.voice.is_playing() {
            self.voice.pause();
        } else {
            self.voice.resume();
        }
        self.voice.playback_state()
    }

    // ── Timers ─────────────────────────────────────────────────────

    /// Start (or restart) a countdown for `step_number`.
    ///
    /// Returns the new timer, or `None` once released.
    pub fn start_timer(
        &self,
        step_number: u32,
        seconds: i64,
        label: impl Into<String>,
    ) -> Option<TimerState> {
        let mut position = self.lock();
        if position.released {
            return None;
        }
        position.paused_timers.remove(&step_number);

        match self.timers.start(step_number, seconds, label) {
            Ok(timer) => {
                drop(position);
                self.emitter.emit(SessionEvent::TimerStarted {
                    timer: timer.clone(),
                });
                Some(timer)
            }
            Err(e) => {
                warn!(step_number, error = %e, "Timer not started");
                None
            }
        }
    }

    /// Cancel the countdown for `step_number`. `false` if none was running.
    pub fn cancel_timer(&self, step_number: u32) -> bool {
        let mut position = self.lock();
        position.paused_timers.remove(&step_number);
        let cancelled = self.timers.cancel(step_number).is_some();
        drop(position);

        if cancelled {
            self.emitter
                .emit(SessionEvent::TimerCancelled { step_number });
        }
        cancelled
    }

    /// Cancel every countdown. Returns how many were running.
    pub fn cancel_all_timers(&self) -> usize {
        self.lock().paused_timers.clear();
        self.cancel_timers()
    }

    fn cancel_timers(&self) -> usize {
        let cancelled = self.timers.cancel_all();
        for timer in &cancelled {
            self.emitter.emit(SessionEvent::TimerCancelled {
                step_number: timer.step_number,
            });
        }
        cancelled.len()
    }

    /// Stop a running timer, remembering what was left, or resume it.
    ///
    /// Resuming continues from the remembered remainder. A step with no
    /// remembered remainder starts its full duration. Returns whether a
    /// timer is running for the step afterwards.
    pub fn toggle_timer(&self, step_number: u32) -> bool {
        let mut position = self.lock();
        if position.active_sequence().is_none() {
            debug!(step_number, "Ignoring timer toggle outside an active session");
            return false;
        }

        if let Some(stopped) = self.timers.cancel(step_number) {
            if stopped.remaining_seconds > 0 {
                position.paused_timers.insert(
                    step_number,
                    PausedTimer {
                        remaining_seconds: stopped.remaining_seconds,
                        label: stopped.label,
                    },
                );
            }
            drop(position);
            debug!(
                step_number,
                remaining_seconds = stopped.remaining_seconds,
                "Timer paused"
            );
            self.emitter
                .emit(SessionEvent::TimerCancelled { step_number });
            return false;
        }

        let resume = position.paused_timers.remove(&step_number).map(|paused| {
            (
                i64::try_from(paused.remaining_seconds).unwrap_or(i64::MAX),
                paused.label,
            )
        });
        let full = || {
            position
                .active_sequence()
                .and_then(|s| s.find(step_number))
                .and_then(|step| step.duration_seconds.map(|d| (d, step.timer_label())))
        };
        let Some((seconds, label)) = resume.or_else(full) else {
            debug!(step_number, "No timer to toggle");
            return false;
        };
        drop(position);

        self.start_timer(step_number, seconds, label).is_some()
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Snapshot of the whole session.
    pub fn state(&self) -> SessionState {
        let position = self.lock();
        SessionState {
            sequence: position.sequence.clone(),
            current_index: position.current_index,
            playback: self.voice.playback_state(),
            active_timers: self.timers.all_statuses(),
            status: position.status,
            released: position.released,
        }
    }

    pub fn current_step(&self) -> Option<Step> {
        let position = self.lock();
        position
            .sequence
            .as_ref()
            .and_then(|s| s.get(position.current_index))
            .cloned()
    }

    pub fn total_steps(&self) -> usize {
        self.lock().sequence.as_ref().map_or(0, StepSequence::len)
    }

    /// 1-based position of the current step, 0 before initialization.
    pub fn progress(&self) -> usize {
        self.state().progress()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status
    }

    pub fn is_playing(&self) -> bool {
        self.voice.is_playing()
    }

    pub fn is_speaking(&self) -> bool {
        self.voice.is_speaking()
    }

    pub fn is_voice_available(&self) -> bool {
        self.voice.is_available()
    }

    pub fn active_timers(&self) -> Vec<TimerState> {
        self.timers.all_statuses()
    }

    pub fn timer_status(&self, step_number: u32) -> Option<TimerState> {
        self.timers.status(step_number)
    }

    /// Remaining seconds of a timer paused with [`toggle_timer`](Self::toggle_timer).
    pub fn paused_timer(&self, step_number: u32) -> Option<u64> {
        self.lock()
            .paused_timers
            .get(&step_number)
            .map(|p| p.remaining_seconds)
    }

    pub fn voice(&self) -> &VoiceCoordinator {
        &self.voice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sous_core::{ChannelEmitter, NoopEmitter};
    use sous_timer::{TimerConfig, TimerListener};
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Silent;

    impl TimerListener for Silent {
        fn on_tick(&self, _timer: &TimerState) {}
        fn on_complete(&self, _timer: &TimerState) {}
    }

    fn controller() -> SessionController {
        SessionController::new(
            VoiceCoordinator::unavailable(),
            TimerManager::new(TimerConfig::default(), Arc::new(Silent)),
            Arc::new(NoopEmitter::new()),
            AnnouncementOptions::default(),
        )
    }

    fn observed_controller() -> (SessionController, UnboundedReceiver<SessionEvent>) {
        let (emitter, rx) = ChannelEmitter::new();
        let controller = SessionController::new(
            VoiceCoordinator::unavailable(),
            TimerManager::new(TimerConfig::default(), Arc::new(Silent)),
            Arc::new(emitter),
            AnnouncementOptions::default(),
        );
        (controller, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn recipe() -> Vec<Step> {
        vec![
            Step::new(3, "plate"),
            Step::new(1, "cut"),
            Step::new(2, "fry").with_duration(120),
        ]
    }

    #[test]
    fn test_initialize_sorts_and_starts_at_first() {
        let session = controller();
        session.initialize(recipe()).unwrap();

        let state = session.state();
        let numbers: Vec<u32> = state
            .sequence
            .as_ref()
            .unwrap()
            .iter()
            .map(|s| s.step_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.status, SessionStatus::Active);
        assert_eq!(session.progress(), 1);
    }

    #[test]
    fn test_initialize_empty_fails_session() {
        let (session, mut rx) = observed_controller();
        assert_eq!(session.initialize(vec![]), Err(SessionError::EmptySequence));
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [SessionEvent::SessionFailed { .. }]
        ));
    }

    #[test]
    fn test_initialize_rejects_duplicates() {
        let session = controller();
        let result = session.initialize(vec![Step::new(1, "a"), Step::new(1, "b")]);
        assert_eq!(result, Err(SessionError::DuplicateStepNumber(1)));
        assert!(session.current_step().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_is_clamped() {
        let session = controller();
        session.initialize(recipe()).unwrap();

        assert!(!session.previous_step());
        assert_eq!(session.progress(), 1);

        assert!(session.next_step());
        assert!(session.next_step());
        assert!(!session.next_step());
        assert_eq!(session.current_step().unwrap().step_number, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_step() {
        let (session, mut rx) = observed_controller();
        session.initialize(recipe()).unwrap();
        drain(&mut rx);

        assert_eq!(session.go_to_step(3), Ok(true));
        assert_eq!(session.state().current_index, 2);

        assert_eq!(session.go_to_step(42), Ok(false));
        assert_eq!(session.state().current_index, 2);

        let events = drain(&mut rx);
        assert_eq!(events, vec![SessionEvent::step_changed(3, 2, 3)]);
    }

    #[test]
    fn test_go_to_step_before_initialize() {
        let session = controller();
        assert_eq!(session.go_to_step(1), Err(SessionError::NotInitialized));
        assert!(!session.next_step());
        assert!(!session.announce_current_step());
    }

    #[tokio::test(start_paused = true)]
    async fn test_announcing_timed_step_starts_timer() {
        let session = controller();
        session.initialize(recipe()).unwrap();
        session.next_step();

        let timer = session.timer_status(2).unwrap();
        assert_eq!(timer.total_seconds, 120);
        assert_eq!(timer.label, "step 2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_completes_session() {
        let (session, mut rx) = observed_controller();
        session.initialize(recipe()).unwrap();
        session.next_step();
        drain(&mut rx);

        session.stop();

        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.active_timers().is_empty());
        assert!(!session.next_step());
        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::TimerCancelled { step_number: 2 },
                SessionEvent::SessionCompleted
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_timer_resumes_remaining() {
        let session = controller();
        session.initialize(recipe()).unwrap();
        session.next_step();

        tokio::time::sleep(Duration::from_millis(30_500)).await;
        assert!(!session.toggle_timer(2));
        assert!(session.timer_status(2).is_none());
        assert_eq!(session.paused_timer(2), Some(90));

        assert!(session.toggle_timer(2));
        assert_eq!(session.timer_status(2).unwrap().total_seconds, 90);
        assert_eq!(session.paused_timer(2), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_timer_without_history_starts_full_duration() {
        let session = controller();
        session.initialize(recipe()).unwrap();

        assert!(session.toggle_timer(2));
        assert_eq!(session.timer_status(2).unwrap().total_seconds, 120);
        assert!(!session.toggle_timer(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_timer_after_stop_starts_nothing() {
        let session = controller();
        session
            .initialize(vec![
                Step::new(1, "cut"),
                Step::new(2, "fry").with_duration(120),
            ])
            .unwrap();

        session.stop();

        assert!(!session.toggle_timer(2));
        assert!(session.active_timers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_timer_before_initialize_starts_nothing() {
        let session = controller();

        assert!(!session.toggle_timer(2));
        assert!(session.active_timers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_is_idempotent() {
        let session = controller();
        session.initialize(recipe()).unwrap();
        session.next_step();

        session.release();
        session.release();

        let state = session.state();
        assert!(state.released);
        assert!(state.active_timers.is_empty());
        assert!(session.start_timer(1, 10, "late").is_none());
        assert_eq!(session.initialize(recipe()), Err(SessionError::Released));
    }
}
