//! `sous check`: validate a recipe without starting a session.

use std::path::Path;

use crate::error::CliError;
use crate::presentation::step_table;
use crate::recipe::Recipe;

pub fn execute(path: &Path, json: bool) -> Result<(), CliError> {
    let recipe = Recipe::load(path)?;
    let sequence = recipe.sequence()?;

    if json {
        let rendered = serde_json::to_string_pretty(sequence.as_slice())
            .map_err(|e| CliError::Config(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    let timed = sequence
        .iter()
        .filter(|s| s.duration_seconds.is_some_and(|d| d > 0))
        .count();
    println!("{}", recipe.display_title());
    println!("{} steps, {timed} with timers", sequence.len());
    println!();
    print!("{}", step_table(&sequence));
    Ok(())
}
