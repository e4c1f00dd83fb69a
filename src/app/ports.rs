//! Port traits: the boundary between the lane machines and the board.
//!
//! ```text
//!   AnalogPort ──▶ ┌──────────────┐ ──▶ OutputPort
//!   TickSource ──▶ │  Controller  │ ──▶ EventSink
//!                  └──────────────┘
//! ```
//!
//! Drivers and adapters implement these traits.  The
//! [`Controller`](super::service::Controller) consumes them via generics,
//! so the state machines never touch a register directly and run
//! unchanged against the mocks in the test suite.

use crate::error::{AdcError, Result};
use crate::outputs::OutputImage;

// ───────────────────────────────────────────────────────────────
// Analog input (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Photoresistor input.  Lower readings mean less light, i.e. a car.
pub trait AnalogPort {
    /// Convert `channel` and return the raw reading.
    fn read_channel(&mut self, channel: u8) -> core::result::Result<u16, AdcError>;
}

impl<T: AnalogPort + ?Sized> AnalogPort for &mut T {
    fn read_channel(&mut self, channel: u8) -> core::result::Result<u16, AdcError> {
        (**self).read_channel(channel)
    }
}

// ───────────────────────────────────────────────────────────────
// Output registers (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: receives the register image after every pulse.
pub trait OutputPort {
    /// Drive the signal register and both position registers to `image`.
    fn apply(&mut self, image: &OutputImage) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Timer pulse source
// ───────────────────────────────────────────────────────────────

/// Blocks until the next base-unit pulse.
pub trait TickSource {
    /// Wait for the next pulse.  Returns how many pulses were lost since
    /// the previous call because nobody was waiting for them.
    fn wait_for_pulse(&mut self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
