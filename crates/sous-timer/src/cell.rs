//! Shared state of a single timer.

use std::sync::{Mutex, MutexGuard, PoisonError};

use sous_core::TimerState;

/// One timer's mutable state, shared between its task and the manager.
///
/// `state` is only ever held briefly. `delivery` is held by the timer task
/// for the whole of a listener callback; cancellation takes it after
/// flagging the timer so it returns only once no callback is in flight.
#[derive(Debug)]
pub(crate) struct TimerCell {
    pub(crate) generation: u64,
    state: Mutex<TimerState>,
    delivery: Mutex<()>,
}

impl TimerCell {
    pub(crate) const fn new(generation: u64, state: TimerState) -> Self {
        Self {
            generation,
            state: Mutex::new(state),
            delivery: Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> TimerState {
        self.state().clone()
    }

    pub(crate) fn step_number(&self) -> u32 {
        self.state().step_number
    }

    pub(crate) fn remaining(&self) -> u64 {
        self.state().remaining_seconds
    }

    /// Flag the timer cancelled. Its task checks this before every callback.
    pub(crate) fn mark_cancelled(&self) {
        let mut state = self.state();
        state.cancelled = true;
        state.running = false;
    }

    /// Hold while invoking the listener.
    pub(crate) fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until any in-flight callback for this timer has returned.
    pub(crate) fn wait_for_delivery(&self) {
        drop(self.lock_delivery());
    }

    /// Count down one second. `None` once the timer has been cancelled.
    pub(crate) fn tick(&self) -> Option<TimerState> {
        let mut state = self.state();
        if state.cancelled {
            return None;
        }
        state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
        Some(state.clone())
    }

    /// Mark the countdown finished. `None` once the timer has been cancelled.
    pub(crate) fn finish(&self) -> Option<TimerState> {
        let mut state = self.state();
        if state.cancelled {
            return None;
        }
        state.remaining_seconds = 0;
        state.running = false;
        Some(state.clone())
    }
}
