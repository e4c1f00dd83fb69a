//! Outbound controller events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::fsm::MachineState;

/// Structured events emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started; carries the reduced timer period.
    Started { base_unit_ms: u32 },

    /// A task's machine moved between states during a pulse.
    StateChanged {
        task: &'static str,
        from: MachineState,
        to: MachineState,
    },

    /// A task was handed a state it does not own and restarted.
    MachineReset { task: &'static str, state: MachineState },

    /// Timer pulses arrived while the previous pulse was still running.
    PulsesMissed(u32),
}
