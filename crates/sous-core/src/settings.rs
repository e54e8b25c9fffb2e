//! Session settings and validation.
//!
//! Pure domain types with no infrastructure dependencies. The CLI loads them
//! from a JSON file and applies command-line overrides via [`SettingsUpdate`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default countdown tick, one second.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Default spacing of spoken timer reminders (once per full minute).
pub const DEFAULT_REMINDER_INTERVAL_SECONDS: u64 = 60;

/// Default speaking rate used by the console speech backend.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 180;

/// Session settings.
///
/// All fields are optional to support partial files and graceful defaults;
/// read them through the `effective_*` accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Milliseconds between countdown ticks (10-60000).
    pub tick_interval_ms: Option<u64>,

    /// Seconds between spoken timer reminders.
    pub reminder_interval_seconds: Option<u64>,

    /// Whether to narrate at all. When false the session runs silently.
    pub voice_enabled: Option<bool>,

    /// Simulated speaking rate for the console backend (60-400).
    pub words_per_minute: Option<u32>,

    /// Whether step announcements include the target temperature.
    pub announce_temperature: Option<bool>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            tick_interval_ms: Some(DEFAULT_TICK_INTERVAL_MS),
            reminder_interval_seconds: Some(DEFAULT_REMINDER_INTERVAL_SECONDS),
            voice_enabled: Some(true),
            words_per_minute: Some(DEFAULT_WORDS_PER_MINUTE),
            announce_temperature: Some(true),
        }
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS))
    }

    #[must_use]
    pub fn effective_reminder_interval(&self) -> u64 {
        self.reminder_interval_seconds
            .unwrap_or(DEFAULT_REMINDER_INTERVAL_SECONDS)
    }

    #[must_use]
    pub fn effective_voice_enabled(&self) -> bool {
        self.voice_enabled.unwrap_or(true)
    }

    #[must_use]
    pub fn effective_words_per_minute(&self) -> u32 {
        self.words_per_minute.unwrap_or(DEFAULT_WORDS_PER_MINUTE)
    }

    #[must_use]
    pub fn effective_announce_temperature(&self) -> bool {
        self.announce_temperature.unwrap_or(true)
    }

    /// Merge an update into this one, only touching fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(tick) = other.tick_interval_ms {
            self.tick_interval_ms = tick;
        }
        if let Some(interval) = other.reminder_interval_seconds {
            self.reminder_interval_seconds = interval;
        }
        if let Some(enabled) = other.voice_enabled {
            self.voice_enabled = enabled;
        }
        if let Some(wpm) = other.words_per_minute {
            self.words_per_minute = wpm;
        }
        if let Some(announce) = other.announce_temperature {
            self.announce_temperature = announce;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset the field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub tick_interval_ms: Option<Option<u64>>,
    pub reminder_interval_seconds: Option<Option<u64>>,
    pub voice_enabled: Option<Option<bool>>,
    pub words_per_minute: Option<Option<u32>>,
    pub announce_temperature: Option<Option<bool>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Tick interval must be between 10 and 60000 ms, got {0}")]
    InvalidTickInterval(u64),

    #[error("Reminder interval must be greater than zero")]
    InvalidReminderInterval,

    #[error("Words per minute must be between 60 and 400, got {0}")]
    InvalidWordsPerMinute(u32),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(tick) = settings.tick_interval_ms {
        if !(10..=60_000).contains(&tick) {
            return Err(SettingsError::InvalidTickInterval(tick));
        }
    }

    if settings.reminder_interval_seconds == Some(0) {
        return Err(SettingsError::InvalidReminderInterval);
    }

    if let Some(wpm) = settings.words_per_minute {
        if !(60..=400).contains(&wpm) {
            return Err(SettingsError::InvalidWordsPerMinute(wpm));
        }
    }

    Ok(())
}
