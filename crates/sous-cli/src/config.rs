//! Settings resolution: defaults, then the optional JSON file, then
//! command-line and environment overrides.

use std::path::{Path, PathBuf};

use clap::Args;
use sous_core::{Settings, SettingsUpdate, validate_settings};

use crate::error::CliError;

/// Settings flags shared by session commands.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Milliseconds per countdown second (speeds timers up for demos)
    #[arg(long, env = "SOUS_TICK_INTERVAL_MS")]
    pub tick_interval_ms: Option<u64>,

    /// Seconds between spoken timer reminders
    #[arg(long)]
    pub reminder_interval: Option<u64>,

    /// Simulated speaking rate of the console voice
    #[arg(long)]
    pub words_per_minute: Option<u32>,

    /// Run silently
    #[arg(long, env = "SOUS_NO_VOICE")]
    pub no_voice: bool,
}

impl SettingsArgs {
    fn update(&self) -> SettingsUpdate {
        SettingsUpdate {
            tick_interval_ms: self.tick_interval_ms.map(Some),
            reminder_interval_seconds: self.reminder_interval.map(Some),
            voice_enabled: self.no_voice.then_some(Some(false)),
            words_per_minute: self.words_per_minute.map(Some),
            announce_temperature: None,
        }
    }
}

/// Resolve and validate the effective settings.
pub fn load_settings(args: &SettingsArgs) -> Result<Settings, CliError> {
    let mut settings = match &args.config {
        Some(path) => read_settings_file(path)?,
        None => Settings::with_defaults(),
    };
    settings.merge(&args.update());
    validate_settings(&settings).map_err(|e| CliError::Config(e.to_string()))?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let settings = load_settings(&SettingsArgs::default()).unwrap();
        assert_eq!(settings, Settings::with_defaults());
    }

    #[test]
    fn test_file_then_flags() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"tickIntervalMs": 200, "wordsPerMinute": 120}}"#).unwrap();

        let args = SettingsArgs {
            config: Some(file.path().to_path_buf()),
            tick_interval_ms: Some(20),
            no_voice: true,
            ..SettingsArgs::default()
        };
        let settings = load_settings(&args).unwrap();

        assert_eq!(settings.tick_interval_ms, Some(20));
        assert_eq!(settings.words_per_minute, Some(120));
        assert_eq!(settings.voice_enabled, Some(false));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = SettingsArgs {
            reminder_interval: Some(0),
            ..SettingsArgs::default()
        };
        assert!(matches!(load_settings(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let args = SettingsArgs {
            config: Some(PathBuf::from("/nonexistent/sous.json")),
            ..SettingsArgs::default()
        };
        assert!(matches!(load_settings(&args), Err(CliError::Io(_))));
    }
}
