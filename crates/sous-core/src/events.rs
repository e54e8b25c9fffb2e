//! Canonical event union for session change notifications.
//!
//! The session controller and the timer announcer emit these through a
//! [`SessionEventEmitter`](crate::ports::SessionEventEmitter). Snapshots stay
//! pull-based; events only tell observers that something changed.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "timer_completed", "stepNumber": 2, "label": "step 2" }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::TimerState;

/// Events emitted during a guided session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The current step changed (navigation or initialize).
    StepChanged {
        #[serde(rename = "stepNumber")]
        step_number: u32,
        index: usize,
        #[serde(rename = "totalSteps")]
        total_steps: usize,
    },

    /// A countdown was started (or restarted) for a step.
    TimerStarted { timer: TimerState },

    /// A countdown lost one second.
    TimerTick { timer: TimerState },

    /// A spoken reminder was issued at a minute boundary.
    TimerReminder {
        #[serde(rename = "stepNumber")]
        step_number: u32,
        #[serde(rename = "remainingSeconds")]
        remaining_seconds: u64,
    },

    /// A countdown reached zero.
    TimerCompleted {
        #[serde(rename = "stepNumber")]
        step_number: u32,
        label: String,
    },

    /// A countdown was cancelled before reaching zero.
    TimerCancelled {
        #[serde(rename = "stepNumber")]
        step_number: u32,
    },

    /// The session was stopped.
    SessionCompleted,

    /// `initialize` was rejected.
    SessionFailed { reason: String },
}

impl SessionEvent {
    pub fn step_changed(step_number: u32, index: usize, total_steps: usize) -> Self {
        Self::StepChanged {
            step_number,
            index,
            total_steps,
        }
    }

    /// Step number this event concerns, if any.
    pub const fn step_number(&self) -> Option<u32> {
        match self {
            Self::StepChanged { step_number, .. }
            | Self::TimerReminder { step_number, .. }
            | Self::TimerCompleted { step_number, .. }
            | Self::TimerCancelled { step_number } => Some(*step_number),
            Self::TimerStarted { timer } | Self::TimerTick { timer } => Some(timer.step_number),
            Self::SessionCompleted | Self::SessionFailed { .. } => None,
        }
    }
}
