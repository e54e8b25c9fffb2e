//! Command handlers. Each one resolves its inputs, does its work, and
//! reports failures as [`CliError`](crate::CliError); [`dispatch`] adds the
//! command context at the binary's boundary.

pub mod check;
pub mod run;

use anyhow::Context;

use crate::commands::Commands;
use crate::error::CliError;

/// Run the selected subcommand.
///
/// # Errors
///
/// The handler's [`CliError`], wrapped with which command and recipe failed.
pub async fn dispatch(command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run { recipe, settings } => run::execute(recipe, settings)
            .await
            .with_context(|| format!("Failed to run recipe {}", recipe.display())),
        Commands::Check { recipe, json } => check::execute(recipe, *json)
            .with_context(|| format!("Failed to check recipe {}", recipe.display())),
    }
}

/// Exit code for an error returned by [`dispatch`]; 1 when no [`CliError`]
/// is in the chain.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CliError>())
        .map_or(1, CliError::exit_code)
}
