//! CLI-specific error types and exit codes.

use sous_core::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The recipe was rejected by the session.
    #[error("Invalid recipe: {0}")]
    Recipe(#[from] SessionError),

    /// The recipe or settings file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found, permission denied, broken stdin.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map the error to a sysexits-style exit code.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Recipe(_) => 65, // EX_DATAERR
            Self::Config(_) => 78, // EX_CONFIG
            Self::Io(_) => 74,     // EX_IOERR
        }
    }
}
