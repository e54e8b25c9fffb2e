//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::SettingsArgs;

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive guided session over a recipe file
    Run {
        /// Recipe JSON: a list of steps, or an object with a `steps` list
        recipe: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Validate a recipe file and list its steps
    Check {
        /// Recipe JSON to validate
        recipe: PathBuf,

        /// Print the parsed steps as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
