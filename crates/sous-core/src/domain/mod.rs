//! Domain types for a guided cooking session.
//!
//! These are pure data types: no I/O, no tasks, no locks. Runtime crates
//! produce and consume them as immutable snapshots.

mod session;
mod step;
mod timer;

pub use session::{PlaybackState, SessionState, SessionStatus};
pub use step::{Step, StepSequence};
pub use timer::TimerState;
