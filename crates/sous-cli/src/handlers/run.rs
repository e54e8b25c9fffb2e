//! `sous run`: an interactive guided session on the terminal.
//!
//! Narration goes to stdout through the console speech backend; session
//! events are printed by a separate task; commands are read line by line
//! from stdin.

use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sous_core::ChannelEmitter;
use sous_session::{SessionController, VoiceSetup, bootstrap};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::config::{SettingsArgs, load_settings};
use crate::error::CliError;
use crate::interactive::{HELP, SessionCommand};
use crate::presentation::{clock, event_line, timer_line};
use crate::recipe::Recipe;

/// How long to let the event printer drain after release.
const PRINTER_GRACE: Duration = Duration::from_millis(200);

pub async fn execute(path: &Path, args: &SettingsArgs) -> Result<(), CliError> {
    let settings = load_settings(args)?;
    let recipe = Recipe::load(path)?;

    let (emitter, mut events) = ChannelEmitter::new();
    let session = bootstrap(&settings, VoiceSetup::Console, Arc::new(emitter)).await;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(line) = event_line(&event) {
                println!("{line}");
            }
        }
    });

    let title = begin(&session, recipe)?;

    println!("{title}");
    if !session.is_voice_available() {
        println!("(narration off)");
    }
    println!("Type 'h' for help.");
    session.announce_current_step();

    let result = read_commands(&session).await;

    session.release();
    drop(session);
    if tokio::time::timeout(PRINTER_GRACE, printer).await.is_err() {
        debug!("Event printer still busy at exit");
    }
    result
}

/// Load the recipe's steps into the session and return the title to show.
///
/// The session is released when the steps are rejected.
fn begin(session: &SessionController, recipe: Recipe) -> Result<String, CliError> {
    let title = recipe.display_title().to_string();
    if let Err(e) = session.initialize(recipe.steps) {
        session.release();
        return Err(e.into());
    }
    Ok(title)
}

async fn read_commands(session: &SessionController) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| CliError::Io(e.to_string()))?
    {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<SessionCommand>() {
            Ok(command) => {
                if apply(session, command).is_break() {
                    break;
                }
            }
            Err(message) => eprintln!("{message}"),
        }
    }
    info!("Leaving session");
    Ok(())
}

/// Run one command against the session.
pub fn apply(session: &SessionController, command: SessionCommand) -> ControlFlow<()> {
    match command {
        SessionCommand::Next => {
            if !session.next_step() {
                println!("Already at the last step.");
            }
        }
        SessionCommand::Previous => {
            if !session.previous_step() {
                println!("Already at the first step.");
            }
        }
        SessionCommand::GoTo(step_number) => match session.go_to_step(step_number) {
            Ok(true) => {}
            Ok(false) => println!("No step {step_number}."),
            Err(e) => println!("{e}"),
        },
        SessionCommand::Repeat => {
            session.announce_current_step();
        }
        SessionCommand::PlayPause => {
            let playback = session.toggle_play_pause();
            debug!(?playback, "Toggled narration");
        }
        SessionCommand::ToggleTimer(step_number) => {
            if !session.toggle_timer(step_number) {
                if let Some(remaining) = session.paused_timer(step_number) {
                    println!(
                        "Step {step_number} timer paused with {} left.",
                        clock(remaining)
                    );
                } else {
                    println!("Step {step_number} has no timer.");
                }
            }
        }
        SessionCommand::ListTimers => {
            let timers = session.active_timers();
            if timers.is_empty() {
                println!("No timers running.");
            }
            for timer in &timers {
                println!("{}", timer_line(timer));
            }
        }
        SessionCommand::CancelTimers => {
            let cancelled = session.cancel_all_timers();
            println!("Cancelled {cancelled} timer(s).");
        }
        SessionCommand::Stop => session.stop(),
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}
