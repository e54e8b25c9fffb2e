//! Registry of running step timers.
//!
//! At most one timer exists per step number. Starting a timer for a step
//! that already has one replaces it; the old countdown is cancelled in the
//! same critical section that installs the new one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use sous_core::{Settings, TimerState};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cell::TimerCell;
use crate::error::TimerError;
use crate::listener::TimerListener;
use crate::task::{Countdown, Registry, TickOutcome};

/// Timer manager configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Wall time per countdown second. One second in production.
    pub tick_interval: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl TimerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tick_interval: settings.tick_interval(),
        }
    }
}

/// A registered timer: its shared cell plus the handles that control its task.
pub(crate) struct ActiveTimer {
    pub(crate) cell: Arc<TimerCell>,
    cancel_token: CancellationToken,
    join_handle: JoinHandle<TickOutcome>,
}

impl ActiveTimer {
    /// Stop the task and flag the cell. Never blocks.
    fn signal_cancel(&self) {
        self.cancel_token.cancel();
        self.cell.mark_cancelled();
    }
}

struct Inner {
    timers: Arc<Registry>,
    listener: Arc<dyn TimerListener>,
    config: TimerConfig,
    next_generation: AtomicU64,
    shut_down: AtomicBool,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        for timer in timers.values() {
            timer.signal_cancel();
            timer.join_handle.abort();
        }
    }
}

/// Cloneable handle to the set of running timers.
///
/// Commands are synchronous and may be called from any thread; `start`
/// needs a tokio runtime to spawn the countdown on. Cancellation waits for
/// an in-flight callback of the cancelled timer to return, so commands
/// must not be issued from inside that same timer's callback.
#[derive(Clone)]
pub struct TimerManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("config", &self.inner.config)
            .field("active", &self.active_count())
            .finish_non_exhaustive()
    }
}

impl TimerManager {
    pub fn new(config: TimerConfig, listener: Arc<dyn TimerListener>) -> Self {
        Self {
            inner: Arc::new(Inner {
                timers: Arc::new(Registry::default()),
                listener,
                config,
                next_generation: AtomicU64::new(1),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> TimerConfig {
        self.inner.config
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<u32, ActiveTimer>> {
        self.inner
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Start counting down `duration_seconds` for `step_number`.
    ///
    /// Replaces any timer the step already has. Negative durations are
    /// treated as zero; a zero-length timer completes on its first poll
    /// without ticking.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::ShutDown`] after [`shutdown`](Self::shutdown),
    /// or [`TimerError::NoRuntime`] outside a tokio runtime.
    pub fn start(
        &self,
        step_number: u32,
        duration_seconds: i64,
        label: impl Into<String>,
    ) -> Result<TimerState, TimerError> {
        let runtime = Handle::try_current().map_err(|_| TimerError::NoRuntime(step_number))?;
        let state = TimerState::started(step_number, label, duration_seconds);
        let snapshot = state.clone();

        let replaced = {
            let mut timers = self.timers();
            if self.inner.shut_down.load(Ordering::Acquire) {
                return Err(TimerError::ShutDown);
            }

            let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
            let cell = Arc::new(TimerCell::new(generation, state));
            let cancel_token = CancellationToken::new();
            let countdown = Countdown {
                cell: Arc::clone(&cell),
                cancel_token: cancel_token.clone(),
                tick_interval: self.inner.config.tick_interval,
                listener: Arc::clone(&self.inner.listener),
                registry: Arc::downgrade(&self.inner.timers),
            };
            let join_handle = runtime.spawn(countdown.run());

            let replaced = timers.insert(
                step_number,
                ActiveTimer {
                    cell,
                    cancel_token,
                    join_handle,
                },
            );
            if let Some(old) = &replaced {
                old.signal_cancel();
            }
            replaced
        };

        if let Some(old) = replaced {
            old.cell.wait_for_delivery();
            debug!(step_number, "Replaced existing timer");
        }

        info!(
            step_number,
            seconds = snapshot.total_seconds,
            label = %snapshot.label,
            "Timer started"
        );
        Ok(snapshot)
    }

    /// Cancel the timer for `step_number`, returning its final snapshot
    /// (flagged cancelled) if one was running.
    ///
    /// Once this returns the timer is gone from every snapshot and its
    /// listener will not be called again.
    pub fn cancel(&self, step_number: u32) -> Option<TimerState> {
        let removed = self.timers().remove(&step_number)?;
        let was_running = removed.cell.snapshot().running;

        removed.signal_cancel();
        removed.cell.wait_for_delivery();
        if !was_running {
            // Already completed; only its registry entry was left.
            return None;
        }
        info!(step_number, "Timer cancelled");
        Some(removed.cell.snapshot())
    }

    /// Cancel every timer, returning their final snapshots by step number.
    pub fn cancel_all(&self) -> Vec<TimerState> {
        let drained: Vec<(bool, ActiveTimer)> = self
            .timers()
            .drain()
            .map(|(_, t)| (t.cell.snapshot().running, t))
            .collect();
        for (_, timer) in &drained {
            timer.signal_cancel();
        }
        for (_, timer) in &drained {
            timer.cell.wait_for_delivery();
        }

        let mut cancelled: Vec<TimerState> = drained
            .iter()
            .filter(|(was_running, _)| *was_running)
            .map(|(_, t)| t.cell.snapshot())
            .collect();
        cancelled.sort_by_key(|s| s.step_number);
        if !cancelled.is_empty() {
            info!(count = cancelled.len(), "Cancelled all timers");
        }
        cancelled
    }

    /// Cancel everything and refuse further starts. Idempotent.
    pub fn shutdown(&self) {
        {
            let _timers = self.timers();
            if self.inner.shut_down.swap(true, Ordering::AcqRel) {
                return;
            }
        }
        let cancelled = self.cancel_all().len();
        debug!(cancelled, "Timer manager shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::Acquire)
    }

    /// Snapshot of a running timer. `None` once it completed or was cancelled.
    pub fn status(&self, step_number: u32) -> Option<TimerState> {
        self.timers()
            .get(&step_number)
            .map(|t| t.cell.snapshot())
            .filter(|s| s.running)
    }

    /// Snapshots of all running timers, ordered by step number.
    pub fn all_statuses(&self) -> Vec<TimerState> {
        let mut statuses: Vec<TimerState> = self
            .timers()
            .values()
            .map(|t| t.cell.snapshot())
            .filter(|s| s.running)
            .collect();
        statuses.sort_by_key(|s| s.step_number);
        statuses
    }

    pub fn is_running(&self, step_number: u32) -> bool {
        self.status(step_number).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.timers()
            .values()
            .filter(|t| t.cell.snapshot().running)
            .count()
    }

    /// Whether the countdown task for `step_number` has exited.
    #[cfg(test)]
    fn task_finished(&self, step_number: u32) -> Option<bool> {
        self.timers()
            .get(&step_number)
            .map(|t| t.join_handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Tick(u32, u64),
        Complete(u32, u64),
    }

    #[derive(Default)]
    struct RecordingListener {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingListener {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn completions(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, Call::Complete(..)))
                .collect()
        }

        fn ticks_for(&self, step: u32) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Tick(s, _) if *s == step))
                .count()
        }
    }

    impl TimerListener for RecordingListener {
        fn on_tick(&self, timer: &TimerState) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Tick(timer.step_number, timer.remaining_seconds));
        }

        fn on_complete(&self, timer: &TimerState) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Complete(timer.step_number, timer.total_seconds));
        }
    }

    fn manager() -> (TimerManager, Arc<RecordingListener>) {
        let listener = Arc::new(RecordingListener::default());
        let manager = TimerManager::new(TimerConfig::default(), listener.clone());
        (manager, listener)
    }

    async fn advance_secs(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    /// Advance to just past a tick boundary so the tick has been delivered.
    async fn advance_past(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs) + Duration::from_millis(500)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_reports_full_duration() {
        let (timers, _) = manager();
        let started = assert_ok!(timers.start(2, 120, "step 2"));

        assert_eq!(started.total_seconds, 120);
        assert_eq!(started.remaining_seconds, 120);
        assert!(started.running);
        assert_eq!(timers.status(2).unwrap().label, "step 2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_then_completes_once() {
        let (timers, listener) = manager();
        timers.start(1, 3, "step 1").unwrap();

        advance_past(1).await;
        assert_eq!(timers.status(1).unwrap().remaining_seconds, 2);

        advance_secs(5).await;
        assert_eq!(
            listener.calls(),
            vec![
                Call::Tick(1, 2),
                Call::Tick(1, 1),
                Call::Tick(1, 0),
                Call::Complete(1, 3),
            ]
        );
        assert!(timers.status(1).is_none());
        assert_eq!(timers.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_silences_timer() {
        let (timers, listener) = manager();
        timers.start(4, 60, "step 4").unwrap();
        advance_secs(10).await;

        let stopped = timers.cancel(4).unwrap();
        assert!(stopped.cancelled);
        assert!(!stopped.running);
        assert!(stopped.remaining_seconds <= 51);
        let ticks_at_cancel = listener.ticks_for(4);
        assert!(timers.status(4).is_none());

        advance_secs(120).await;
        assert_eq!(listener.ticks_for(4), ticks_at_cancel);
        assert!(listener.completions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_step_is_noop() {
        let (timers, _) = manager();
        assert!(timers.cancel(9).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_empties_registry() {
        let (timers, listener) = manager();
        timers.start(1, 30, "step 1").unwrap();
        timers.start(2, 45, "step 2").unwrap();
        timers.start(3, 90, "step 3").unwrap();
        advance_secs(5).await;

        let cancelled: Vec<u32> = timers.cancel_all().iter().map(|t| t.step_number).collect();
        assert_eq!(cancelled, vec![1, 2, 3]);
        assert!(timers.all_statuses().is_empty());

        let calls_at_cancel = listener.calls().len();
        advance_secs(200).await;
        assert_eq!(listener.calls().len(), calls_at_cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_timer() {
        let (timers, listener) = manager();
        timers.start(2, 120, "step 2").unwrap();
        advance_past(10).await;

        timers.start(2, 30, "step 2").unwrap();
        assert_eq!(timers.status(2).unwrap().remaining_seconds, 30);
        assert_eq!(timers.all_statuses().len(), 1);

        advance_secs(300).await;
        assert_eq!(listener.completions(), vec![Call::Complete(2, 30)]);
        // 10 ticks from the first run, 30 from the replacement
        assert_eq!(listener.ticks_for(2), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_completes_immediately() {
        let (timers, listener) = manager();
        timers.start(5, 0, "step 5").unwrap();
        timers.start(6, -3, "step 6").unwrap();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let mut completions = listener.completions();
        completions.sort_by_key(|c| match c {
            Call::Tick(s, _) | Call::Complete(s, _) => *s,
        });
        assert_eq!(completions, vec![Call::Complete(5, 0), Call::Complete(6, 0)]);
        assert_eq!(listener.ticks_for(5), 0);
        assert!(timers.all_statuses().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_statuses_sorted_by_step() {
        let (timers, _) = manager();
        timers.start(7, 10, "step 7").unwrap();
        timers.start(3, 10, "step 3").unwrap();
        timers.start(5, 10, "step 5").unwrap();

        let steps: Vec<u32> = timers.all_statuses().iter().map(|t| t.step_number).collect();
        assert_eq!(steps, vec![3, 5, 7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_rejects_new_timers() {
        let (timers, listener) = manager();
        timers.start(1, 30, "step 1").unwrap();

        timers.shutdown();
        timers.shutdown();
        assert!(timers.is_shut_down());
        let err = assert_err!(timers.start(2, 30, "step 2"));
        assert_eq!(err, TimerError::ShutDown);

        advance_secs(60).await;
        assert!(listener.completions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_task_exits() {
        let (timers, _) = manager();
        timers.start(1, 100, "step 1").unwrap();
        advance_past(1).await;
        assert_eq!(timers.task_finished(1), Some(false));

        advance_secs(200).await;
        assert_eq!(timers.task_finished(1), None);
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let (timers, _) = manager();
        assert_eq!(
            timers.start(1, 10, "step 1"),
            Err(TimerError::NoRuntime(1))
        );
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings {
            tick_interval_ms: Some(50),
            ..Settings::default()
        };
        assert_eq!(
            TimerConfig::from_settings(&settings).tick_interval,
            Duration::from_millis(50)
        );
    }
}
