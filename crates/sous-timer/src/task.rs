//! The per-timer countdown loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cell::TimerCell;
use crate::listener::TimerListener;
use crate::manager::ActiveTimer;

/// How a countdown task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Completed,
    Cancelled,
}

pub(crate) type Registry = Mutex<HashMap<u32, ActiveTimer>>;

/// Everything a countdown task needs, moved onto its task.
pub(crate) struct Countdown {
    pub(crate) cell: Arc<TimerCell>,
    pub(crate) cancel_token: CancellationToken,
    pub(crate) tick_interval: Duration,
    pub(crate) listener: Arc<dyn TimerListener>,
    pub(crate) registry: Weak<Registry>,
}

impl Countdown {
    /// Tick once per interval until the remaining time reaches zero, then
    /// report completion and leave the registry.
    ///
    /// Each callback is made under the cell's delivery lock and only after
    /// re-checking the cancelled flag, so a cancelled timer goes silent as
    /// soon as the flag is set.
    pub(crate) async fn run(self) -> TickOutcome {
        let step_number = self.cell.step_number();
        let mut ticker = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.cell.remaining() > 0 {
            tokio::select! {
                biased;
                () = self.cancel_token.cancelled() => {
                    debug!(step_number, "Timer cancelled");
                    return TickOutcome::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            let _delivery = self.cell.lock_delivery();
            let Some(snapshot) = self.cell.tick() else {
                return TickOutcome::Cancelled;
            };
            self.listener.on_tick(&snapshot);
        }

        {
            let _delivery = self.cell.lock_delivery();
            let Some(snapshot) = self.cell.finish() else {
                return TickOutcome::Cancelled;
            };
            debug!(step_number, total = snapshot.total_seconds, "Timer completed");
            self.listener.on_complete(&snapshot);
        }

        self.leave_registry(step_number);
        TickOutcome::Completed
    }

    /// Remove this timer's entry unless a replacement already took the slot.
    fn leave_registry(&self, step_number: u32) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut timers = registry.lock().unwrap_or_else(PoisonError::into_inner);
        if timers
            .get(&step_number)
            .is_some_and(|t| t.cell.generation == self.cell.generation)
        {
            timers.remove(&step_number);
        }
    }
}
