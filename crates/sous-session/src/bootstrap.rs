//! Composition root for a session: voice, then announcer, then timers,
//! then the controller that drives them.

use std::sync::Arc;

use sous_core::{SessionEventEmitter, Settings};
use sous_timer::{TimerConfig, TimerManager};
use sous_voice::backend::BackendEventReceiver;
use sous_voice::{
    AnnouncementOptions, ConsoleBackend, SpeechBackend, VoiceCoordinator, event_channel,
};
use tracing::info;

use crate::announcer::TimerAnnouncer;
use crate::controller::SessionController;

/// Which speech backend narrates the session.
pub enum VoiceSetup {
    /// No narration; the session runs silently.
    Disabled,
    /// Print utterances to stdout at the configured speaking rate.
    Console,
    /// A caller-provided backend and the receiving end of its event channel.
    Backend {
        backend: Arc<dyn SpeechBackend>,
        events: BackendEventReceiver,
    },
}

/// Build a ready-to-initialize [`SessionController`].
///
/// `voiceEnabled = false` in `settings` overrides `voice`. Must be called
/// inside a tokio runtime.
pub async fn bootstrap(
    settings: &Settings,
    voice: VoiceSetup,
    emitter: Arc<dyn SessionEventEmitter>,
) -> SessionController {
    let voice = if settings.effective_voice_enabled() {
        voice
    } else {
        VoiceSetup::Disabled
    };

    let voice = match voice {
        VoiceSetup::Disabled => VoiceCoordinator::unavailable(),
        VoiceSetup::Console => {
            let (tx, rx) = event_channel();
            let backend = ConsoleBackend::new(tx, settings.effective_words_per_minute());
            VoiceCoordinator::connect(Arc::new(backend), rx).await
        }
        VoiceSetup::Backend { backend, events } => VoiceCoordinator::connect(backend, events).await,
    };

    let announcer = TimerAnnouncer::new(
        voice.clone(),
        Arc::clone(&emitter),
        settings.effective_reminder_interval(),
    );
    let timers = TimerManager::new(TimerConfig::from_settings(settings), Arc::new(announcer));
    let options = AnnouncementOptions {
        temperature: settings.effective_announce_temperature(),
    };

    info!(
        voice_available = voice.is_available(),
        tick_ms = u64::try_from(timers.config().tick_interval.as_millis()).unwrap_or(u64::MAX),
        "Session components ready"
    );
    SessionController::new(voice, timers, emitter, options)
}
