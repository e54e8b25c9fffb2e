//! Voice coordinator: serializes all spoken output through one backend.
//!
//! ```text
//!   Idle → Announcing → Speaking → Idle
//!                          ⇅
//!                        Paused
//! ```
//!
//! Commands (`speak`, `speak_next`, `pause`, `resume`, `stop`) transition the
//! state synchronously under the coordinator's lock and hand at most one
//! utterance to the backend. Backend lifecycle events arrive on a channel and
//! are applied by a pump task under the same lock, so every state change goes
//! through one serialized path. Events for an utterance that is no longer
//! current (it was flushed, paused or stopped) are stale and ignored.
//!
//! # Locking discipline
//!
//! The core lock is a std mutex that is never held across an `.await`.
//! Backend calls happen while it is held; backends must return promptly and
//! must not call back into the coordinator.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;
use sous_core::PlaybackState;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::{BackendEvent, BackendEventReceiver, SpeechBackend, UtteranceId};

/// Observable state of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceStatus {
    pub playback: PlaybackState,
    pub available: bool,
    /// Utterances waiting behind the current one.
    pub queued: usize,
    /// Most recent text handed to the backend (what `resume` replays).
    pub last_text: Option<String>,
}

impl VoiceStatus {
    pub const fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub const fn is_speaking(&self) -> bool {
        self.playback.is_speaking()
    }
}

/// Cloneable handle to the voice coordinator.
///
/// All clones share one backend, one queue and one state.
#[derive(Clone)]
pub struct VoiceCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    core: Mutex<VoiceCore>,
    status_tx: watch::Sender<VoiceStatus>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

struct VoiceCore {
    /// `None` when the backend failed to initialize.
    backend: Option<Arc<dyn SpeechBackend>>,
    playback: PlaybackState,
    /// Utterance the backend is working on.
    current: Option<UtteranceId>,
    queue: VecDeque<String>,
    last_text: Option<String>,
    next_id: u64,
    released: bool,
}

impl VoiceCoordinator {
    /// Initialize `backend` and start consuming its lifecycle events.
    ///
    /// A backend that fails to initialize yields an unavailable coordinator:
    /// every speak call becomes a no-op and [`is_available`](Self::is_available)
    /// reports `false`. Must be called inside a tokio runtime.
    pub async fn connect(backend: Arc<dyn SpeechBackend>, events: BackendEventReceiver) -> Self {
        match backend.initialize().await {
            Ok(()) => {
                let coordinator = Self::build(Some(backend));
                coordinator.spawn_pump(events);
                tracing::info!("Voice coordinator connected");
                coordinator
            }
            Err(e) => {
                tracing::warn!(error = %e, "Speech backend unavailable, narration disabled");
                Self::build(None)
            }
        }
    }

    /// A coordinator with no backend; all output is silently dropped.
    pub fn unavailable() -> Self {
        Self::build(None)
    }

    fn build(backend: Option<Arc<dyn SpeechBackend>>) -> Self {
        let core = VoiceCore {
            backend,
            playback: PlaybackState::Idle,
            current: None,
            queue: VecDeque::new(),
            last_text: None,
            next_id: 1,
            released: false,
        };
        let (status_tx, _) = watch::channel(core.status());
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(core),
                status_tx,
                pump: Mutex::new(None),
            }),
        }
    }

    fn spawn_pump(&self, mut events: BackendEventReceiver) {
        // Weak so that dropping every handle tears the coordinator down,
        // which drops the backend and with it the event sender.
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(inner) = weak.upgrade() else { break };
                inner.apply(|core| core.on_backend_event(event));
            }
            tracing::debug!("Voice event pump finished");
        });
        *self.inner.lock_pump() = Some(handle);
    }

    // ── Commands ───────────────────────────────────────────────────

    /// Flush mode: drop anything queued or in flight and speak `text` now.
    pub fn speak(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.apply(|core| {
            if !core.accepts_output() {
                return;
            }
            core.queue.clear();
            core.halt_current();
            core.dispatch(text);
        });
    }

    /// Append mode: speak `text` after everything already requested.
    pub fn speak_next(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.apply(|core| {
            if !core.accepts_output() {
                return;
            }
            if core.current.is_none() && core.playback == PlaybackState::Idle {
                core.dispatch(text);
            } else {
                core.queue.push_back(text);
            }
        });
    }

    /// Halt audio but keep the text so [`resume`](Self::resume) can replay it.
    pub fn pause(&self) {
        self.inner.apply(|core| {
            if core.playback.is_playing() {
                core.halt_current();
                core.playback = PlaybackState::Paused;
                tracing::debug!("Voice paused");
            }
        });
    }

    /// Replay the last text in flush mode.
    ///
    /// Utterances appended while paused are discarded.
    pub fn resume(&self) {
        self.inner.apply(|core| {
            if !core.accepts_output() || core.playback.is_playing() {
                return;
            }
            let Some(text) = core.last_text.clone() else {
                return;
            };
            tracing::debug!("Voice resumed");
            core.queue.clear();
            core.halt_current();
            core.dispatch(text);
        });
    }

    /// Discard the queue, halt audio, return to idle.
    pub fn stop(&self) {
        self.inner.apply(|core| {
            core.queue.clear();
            core.halt_current();
            core.playback = PlaybackState::Idle;
        });
    }

    /// Stop and shut the backend down. Safe to call more than once.
    pub fn release(&self) {
        let released_now = self.inner.apply(|core| {
            core.queue.clear();
            core.halt_current();
            core.playback = PlaybackState::Idle;
            if core.released {
                return false;
            }
            core.released = true;
            if let Some(backend) = core.backend.take() {
                backend.shutdown();
            }
            true
        });

        if released_now {
            if let Some(pump) = self.inner.lock_pump().take() {
                pump.abort();
            }
            tracing::info!("Voice coordinator released");
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Whether a working backend is attached.
    pub fn is_available(&self) -> bool {
        self.inner.lock_core().backend.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.inner.lock_core().released
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.inner.lock_core().playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state().is_playing()
    }

    pub fn is_speaking(&self) -> bool {
        self.playback_state().is_speaking()
    }

    pub fn status(&self) -> VoiceStatus {
        self.inner.lock_core().status()
    }

    /// Receive every status change.
    pub fn subscribe(&self) -> watch::Receiver<VoiceStatus> {
        self.inner.status_tx.subscribe()
    }
}

impl Inner {
    fn lock_core(&self) -> MutexGuard<'_, VoiceCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pump(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pump.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the core lock and publish the resulting status.
    fn apply<R>(&self, f: impl FnOnce(&mut VoiceCore) -> R) -> R {
        let mut core = self.lock_core();
        let before = core.playback;
        let result = f(&mut core);
        if before != core.playback {
            tracing::debug!(old = ?before, new = ?core.playback, "Voice state transition");
        }
        self.status_tx.send_if_modified(|status| {
            let next = core.status();
            if *status == next {
                false
            } else {
                *status = next;
                true
            }
        });
        result
    }
}

impl VoiceCore {
    fn accepts_output(&self) -> bool {
        if self.released {
            tracing::debug!("Voice released, dropping utterance");
            return false;
        }
        if self.backend.is_none() {
            tracing::debug!("Voice unavailable, dropping utterance");
            return false;
        }
        true
    }

    fn status(&self) -> VoiceStatus {
        VoiceStatus {
            playback: self.playback,
            available: self.backend.is_some(),
            queued: self.queue.len(),
            last_text: self.last_text.clone(),
        }
    }

    /// Abandon the in-flight utterance; its late events become stale.
    fn halt_current(&mut self) {
        if self.current.take().is_some() {
            if let Some(backend) = &self.backend {
                backend.stop();
            }
        }
    }

    /// Hand `text` to the backend as the new current utterance.
    fn dispatch(&mut self, text: String) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        let id = UtteranceId(self.next_id);
        self.next_id += 1;

        match backend.speak(id, &text) {
            Ok(()) => {
                tracing::debug!(utterance_id = %id, "Utterance dispatched");
                self.current = Some(id);
                self.playback = PlaybackState::Announcing;
            }
            Err(e) => {
                tracing::warn!(utterance_id = %id, error = %e, "Backend rejected utterance");
                self.current = None;
                self.playback = PlaybackState::Idle;
            }
        }
        self.last_text = Some(text);
    }

    /// Start the next queued utterance, or go idle.
    fn advance(&mut self) {
        self.current = None;
        match self.queue.pop_front() {
            Some(next) => self.dispatch(next),
            None => self.playback = PlaybackState::Idle,
        }
    }

    fn on_backend_event(&mut self, event: BackendEvent) {
        if self.current != Some(event.utterance()) {
            tracing::trace!(?event, "Ignoring stale backend event");
            return;
        }

        match event {
            BackendEvent::Started(_) => self.playback = PlaybackState::Speaking,
            BackendEvent::Done(_) => self.advance(),
            BackendEvent::Error(id, message) => {
                tracing::warn!(utterance_id = %id, error = %message, "Speech backend error");
                self.advance();
            }
            BackendEvent::Stopped(_) => {
                self.current = None;
                self.queue.clear();
                self.playback = PlaybackState::Idle;
            }
        }
    }
}
