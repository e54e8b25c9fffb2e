//! `sous` command-line adapter.
//!
//! Loads a recipe and settings, wires a session through
//! [`sous_session::bootstrap`], and drives it from stdin.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

// Used by the binary only.
use dotenvy as _;
use tracing_subscriber as _;

pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod interactive;
pub mod parser;
pub mod presentation;
pub mod recipe;

pub use commands::Commands;
pub use config::SettingsArgs;
pub use error::CliError;
pub use parser::Cli;
