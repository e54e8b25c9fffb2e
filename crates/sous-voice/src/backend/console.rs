//! Console speech backend. Prints utterances and simulates speaking time.
//!
//! Each utterance runs on its own tokio task that reports `Started`, waits
//! for the time the text would take to say at the configured speaking rate,
//! and then reports `Done`. `stop` cancels the task, which reports `Stopped`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{BackendEvent, BackendEventSender, SpeechBackend, UtteranceId};
use crate::error::VoiceError;

/// Shortest simulated utterance.
const MIN_UTTERANCE: Duration = Duration::from_millis(300);

/// Text-to-console backend.
pub struct ConsoleBackend {
    events: BackendEventSender,
    words_per_minute: u32,
    /// Cancellation handle of the utterance currently "playing".
    current: Mutex<Option<(UtteranceId, CancellationToken)>>,
    shut_down: AtomicBool,
}

impl ConsoleBackend {
    pub fn new(events: BackendEventSender, words_per_minute: u32) -> Self {
        Self {
            events,
            words_per_minute: words_per_minute.max(1),
            current: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Time it takes to say `text` at this backend's speaking rate.
    pub fn speaking_time(&self, text: &str) -> Duration {
        let words = u64::try_from(text.split_whitespace().count()).unwrap_or(u64::MAX);
        let millis = words.saturating_mul(60_000) / u64::from(self.words_per_minute);
        Duration::from_millis(millis).max(MIN_UTTERANCE)
    }

    fn cancel_current(&self) {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((id, token)) = previous {
            tracing::debug!(utterance_id = %id, "Console backend: cutting utterance short");
            token.cancel();
        }
    }
}

#[async_trait::async_trait]
impl SpeechBackend for ConsoleBackend {
    async fn initialize(&self) -> Result<(), VoiceError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(VoiceError::Unavailable(
                "console backend requires a tokio runtime".to_string(),
            ));
        }
        tracing::info!(wpm = self.words_per_minute, "Console speech backend ready");
        Ok(())
    }

    fn speak(&self, id: UtteranceId, text: &str) -> Result<(), VoiceError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(VoiceError::Released);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| VoiceError::Backend(e.to_string()))?;

        self.cancel_current();

        let token = CancellationToken::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some((id, token.clone()));

        let events = self.events.clone();
        let speaking_time = self.speaking_time(text);
        let text = text.to_string();

        runtime.spawn(async move {
            let _ = events.send(BackendEvent::Started(id));
            println!("🔊 {text}");

            tokio::select! {
                () = tokio::time::sleep(speaking_time) => {
                    let _ = events.send(BackendEvent::Done(id));
                }
                () = token.cancelled() => {
                    let _ = events.send(BackendEvent::Stopped(id));
                }
            }
        });

        Ok(())
    }

    fn stop(&self) {
        self.cancel_current();
    }

    fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            self.cancel_current();
            tracing::debug!("Console speech backend shut down");
        }
    }
}
