//! Session layer for sous: the controller presentation code talks to.
//!
//! - [`controller`]: [`SessionController`], step navigation and the
//!   command surface.
//! - [`announcer`]: [`TimerAnnouncer`], which turns timer callbacks into
//!   spoken reminders and session events.
//! - [`bootstrap`](mod@bootstrap): wires voice, timers and controller together.

#![deny(unused_crate_dependencies)]

pub mod announcer;
pub mod bootstrap;
pub mod controller;

pub use announcer::TimerAnnouncer;
pub use bootstrap::{VoiceSetup, bootstrap};
pub use controller::SessionController;

#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tokio_util as _;
