//! Base-unit timer pulses.
//!
//! On a board the hardware timer interrupt calls
//! [`TickFlag::pulse_from_isr`] once per base unit and the main loop
//! blocks in [`TickSource::wait_for_pulse`].  A pulse that arrives while
//! the previous one is still pending is not queued: it is counted as
//! missed and the scheduler simply runs late.
//!
//! On host the [`SimTimer`] approximates the same contract with
//! `thread::sleep`.
//!
//! ```text
//!  timer ISR ──▶ TickFlag (AtomicBool) ──▶ main loop ──▶ Controller::pulse
//!                    └─ already set? ──▶ missed += 1
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::app::ports::TickSource;

// ───────────────────────────────────────────────────────────────
// Interrupt flag
// ───────────────────────────────────────────────────────────────

/// Single-slot pulse flag shared between the timer interrupt and the
/// main loop.  Safe to touch from interrupt context: only atomics.
pub struct TickFlag {
    pending: AtomicBool,
    missed: AtomicU32,
}

impl TickFlag {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            missed: AtomicU32::new(0),
        }
    }

    /// Record one pulse.  Called from the timer interrupt.
    pub fn pulse_from_isr(&self) {
        if self.pending.swap(true, Ordering::AcqRel) {
            self.missed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Consume a pending pulse, if any.
    pub fn try_take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Number of pulses dropped since the last call.
    pub fn take_missed(&self) -> u32 {
        self.missed.swap(0, Ordering::Relaxed)
    }
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for &TickFlag {
    fn wait_for_pulse(&mut self) -> u32 {
        while !self.try_take() {
            core::hint::spin_loop();
        }
        self.take_missed()
    }
}

// ───────────────────────────────────────────────────────────────
// Host timer
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "none"))]
pub use sim::SimTimer;

#[cfg(not(target_os = "none"))]
mod sim {
    use std::thread;
    use std::time::{Duration, Instant};

    use log::debug;

    use crate::app::ports::TickSource;

    /// Sleep-based pulse source with a fixed-rate schedule.  If the caller
    /// falls more than one interval behind, the skipped deadlines are
    /// reported as missed pulses instead of being replayed.
    pub struct SimTimer {
        interval: Duration,
        next: Instant,
    }

    impl SimTimer {
        /// A timer pulsing every `base_unit_ms` milliseconds, starting now.
        pub fn new(base_unit_ms: u32) -> Self {
            let interval = Duration::from_millis(u64::from(base_unit_ms.max(1)));
            Self {
                interval,
                next: Instant::now() + interval,
            }
        }

        pub fn interval(&self) -> Duration {
            self.interval
        }
    }

    impl TickSource for SimTimer {
        fn wait_for_pulse(&mut self) -> u32 {
            let now = Instant::now();
            if now < self.next {
                thread::sleep(self.next - now);
                self.next += self.interval;
                return 0;
            }

            let behind = (now - self.next).as_nanos() / self.interval.as_nanos();
            let missed = u32::try_from(behind).unwrap_or(u32::MAX);
            debug!("SimTimer: {} deadline(s) overrun", missed);
            self.next += self.interval.saturating_mul(missed.saturating_add(1));
            missed
        }
    }
}
