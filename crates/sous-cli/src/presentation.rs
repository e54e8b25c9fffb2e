//! Terminal rendering of steps, timers and session events.

use std::fmt::Write as _;

use sous_core::{SessionEvent, Step, StepSequence, TimerState};

/// `m:ss`, or `h:mm:ss` past an hour.
pub fn clock(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// One line per step: number, flags, duration and instruction.
pub fn step_table(sequence: &StepSequence) -> String {
    let mut out = String::new();
    for step in sequence {
        let _ = writeln!(out, "{}", step_line(step));
    }
    out
}

pub fn step_line(step: &Step) -> String {
    let key = if step.is_key_step { "*" } else { " " };
    let duration = step
        .duration_seconds
        .and_then(|d| u64::try_from(d).ok())
        .map_or_else(String::new, |d| format!("[{}] ", clock(d)));
    let temperature = step
        .temperature
        .map_or_else(String::new, |t| format!("({t}°) "));
    format!(
        "{key}{:>3}. {duration}{temperature}{}",
        step.step_number, step.instruction
    )
}

pub fn timer_line(timer: &TimerState) -> String {
    format!(
        "  {:<24} {} / {}  ({:.0}%)",
        timer.label,
        clock(timer.remaining_seconds),
        clock(timer.total_seconds),
        timer.progress() * 100.0
    )
}

/// Status line for an event, or `None` for events too chatty to print.
pub fn event_line(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::StepChanged {
            step_number,
            index,
            total_steps,
        } => Some(format!(
            "── step {step_number} ({}/{total_steps}) ──",
            index + 1
        )),
        SessionEvent::TimerStarted { timer } => Some(format!(
            "⏱  {} started ({})",
            timer.label,
            clock(timer.total_seconds)
        )),
        SessionEvent::TimerReminder {
            step_number,
            remaining_seconds,
        } => Some(format!(
            "⏱  step {step_number}: {} left",
            clock(*remaining_seconds)
        )),
        SessionEvent::TimerCompleted { label, .. } => Some(format!("⏰ {label} done")),
        SessionEvent::TimerCancelled { step_number } => {
            Some(format!("⏱  step {step_number} timer stopped"))
        }
        SessionEvent::SessionCompleted => Some("Session finished.".to_string()),
        SessionEvent::SessionFailed { reason } => Some(format!("Session failed: {reason}")),
        SessionEvent::TimerTick { .. } => None,
    }
}
