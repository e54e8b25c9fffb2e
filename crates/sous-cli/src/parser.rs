//! Root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Guided, narrated cooking sessions in the terminal.
#[derive(Parser)]
#[command(name = "sous")]
#[command(about = "Step through a recipe hands-free, with spoken steps and timers")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["sous", "check", "pasta.json", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Check { .. }));
    }
}
