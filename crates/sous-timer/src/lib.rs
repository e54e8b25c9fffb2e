//! Timer subsystem for sous: independent, cancellable per-step countdowns.
//!
//! Each timer runs on its own tokio task and ticks once per configured
//! interval. The set of active timers is guarded by a single registry lock;
//! per-timer delivery locks make cancellation synchronous with respect to
//! callbacks, so once [`TimerManager::cancel`] or
//! [`TimerManager::cancel_all`] returns, the cancelled timers never call
//! their listener again.

#![deny(unused_crate_dependencies)]

mod cell;
pub mod error;
pub mod listener;
pub mod manager;
mod task;

pub use error::TimerError;
pub use listener::{NoopListener, TimerListener};
pub use manager::{TimerConfig, TimerManager};

#[cfg(test)]
use tokio_test as _;
