//! Cooperative, time-triggered task scheduler.
//!
//! Every hardware timer pulse walks the fixed task list once, in list
//! order.  A task fires when its elapsed count has reached its period:
//! its tick function maps the current state to the next one and the
//! count restarts.  Every task then advances by one pulse.
//!
//! ```text
//!  timer pulse ──▶ for task in tasks:
//!                    if elapsed == period:
//!                        state   = tick_fn(state, ctx)
//!                        elapsed = 0
//!                    elapsed += 1
//! ```
//!
//! Tick functions run to completion; nothing here blocks or preempts.
//! A pulse that arrives while a pass is still running is lost upstream
//! (see [`crate::drivers::tick_timer`]), never queued.

use heapless::Vec;
use log::{debug, info};

use crate::error::SchedulerError;

/// Tick function: consumes the current state, returns the next one.
pub type TickFn<S, C> = fn(S, &mut C) -> S;

/// One entry in the task list.
pub struct Task<S, C> {
    /// Human-readable label used in logs and events.
    pub label: &'static str,
    /// Current state, replaced by every firing.
    pub state: S,
    /// Firing period in scheduler base units.
    pub period: u32,
    /// Base units elapsed since the last firing.
    pub elapsed_time: u32,
    /// State transformer invoked on firing.
    pub tick_fn: TickFn<S, C>,
}

/// Fixed-capacity cooperative scheduler.
pub struct Scheduler<S, C, const N: usize> {
    tasks: Vec<Task<S, C>, N>,
    pulses: u64,
}

impl<S: Copy, C, const N: usize> Scheduler<S, C, N> {
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            pulses: 0,
        }
    }

    /// Append a task.  It starts with `elapsed_time == period`, so it
    /// fires on the very first pulse.  Returns the task's list index.
    pub fn add(
        &mut self,
        label: &'static str,
        initial: S,
        period: u32,
        tick_fn: TickFn<S, C>,
    ) -> Result<usize, SchedulerError> {
        if period == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        let index = self.tasks.len();
        self.tasks
            .push(Task {
                label,
                state: initial,
                period,
                elapsed_time: period,
                tick_fn,
            })
            .map_err(|_| SchedulerError::Full { capacity: N })?;
        info!("Scheduler: added '{}' at slot {} (period {})", label, index, period);
        Ok(index)
    }

    /// Handle one timer pulse.  Returns how many tasks fired.
    pub fn pulse(&mut self, ctx: &mut C) -> usize {
        self.pulses = self.pulses.wrapping_add(1);
        let mut fired = 0;

        for task in self.tasks.iter_mut() {
            if task.elapsed_time == task.period {
                task.state = (task.tick_fn)(task.state, ctx);
                task.elapsed_time = 0;
                fired += 1;
            }
            task.elapsed_time += 1;
        }

        debug!("Scheduler: pulse {} fired {} task(s)", self.pulses, fired);
        fired
    }

    /// The task list, in firing order.
    pub fn tasks(&self) -> &[Task<S, C>] {
        &self.tasks
    }

    /// Current state of the task at `index`.
    pub fn state(&self, index: usize) -> Option<S> {
        self.tasks.get(index).map(|t| t.state)
    }

    /// Overwrite a task's state.  Used to restore a machine to a known
    /// state in tests and by diagnostics.
    pub fn set_state(&mut self, index: usize, state: S) {
        if let Some(task) = self.tasks.get_mut(index) {
            task.state = state;
        }
    }

    /// Pulses handled since construction.
    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }
}

impl<S: Copy, C, const N: usize> Default for Scheduler<S, C, N> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
