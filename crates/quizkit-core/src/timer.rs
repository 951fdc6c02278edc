//! Countdown timer.
//!
//! The countdown is a Tokio task that ticks once per period and reports each
//! tick to a [`CountdownTarget`]. It holds only a [`Weak`] reference to its
//! target and the id of the run it was armed for, so a dropped quiz or a
//! newer run silently ends it.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::session::TickOutcome;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Receives countdown ticks.
pub trait CountdownTarget: Send + Sync + 'static {
    /// Advance the countdown of run `run_id` by one tick.
    fn on_tick(&self, run_id: u64) -> TickOutcome;
}

/// A running countdown. Aborted on [`CountdownHandle::cancel`] or drop.
#[derive(Debug)]
pub struct CountdownHandle {
    run_id: u64,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Spawn a countdown for `run_id` on `runtime`.
    pub fn spawn<T: CountdownTarget>(
        runtime: &Handle,
        target: Weak<T>,
        run_id: u64,
        period: Duration,
    ) -> Self {
        let task = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(target) = target.upgrade() else {
                    tracing::debug!(run_id, "countdown target dropped");
                    break;
                };
                match target.on_tick(run_id) {
                    TickOutcome::Running(_) => {}
                    TickOutcome::Expired => {
                        tracing::debug!(run_id, "countdown expired");
                        break;
                    }
                    TickOutcome::Ignored => {
                        tracing::debug!(run_id, "countdown no longer current");
                        break;
                    }
                }
            }
        });
        tracing::debug!(run_id, "countdown armed");
        Self { run_id, task }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::debug!(run_id = self.run_id, "countdown detached");
        }
        self.task.abort();
    }
}

/// How close the countdown is to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerUrgency {
    Normal,
    /// Five minutes or less.
    Warning,
    /// The last minute.
    Critical,
}

impl TimerUrgency {
    pub fn from_remaining(secs: u32) -> Self {
        if secs <= 60 {
            TimerUrgency::Critical
        } else if secs <= 300 {
            TimerUrgency::Warning
        } else {
            TimerUrgency::Normal
        }
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
