//! Shared mutable context threaded through every tick function.
//!
//! `FsmContext` is the blackboard the four machines read from and write
//! to: the analog input port, the output register image, the per-lane
//! handshakes, each machine's dwell counter and the configuration.
//! Every field group has a single writing machine; see
//! [`crate::outputs`] and [`crate::handshake`] for the ownership rules.

use heapless::Vec;
use log::warn;

use super::{Lane, MachineKind};
use crate::app::ports::AnalogPort;
use crate::config::ControllerConfig;
use crate::handshake::Handshake;
use crate::outputs::OutputImage;

/// Reading substituted when a conversion fails: never below any threshold.
pub const FAILED_READING: u16 = u16::MAX;

/// Maximum machine resets buffered between two drains.
const RESET_LOG_CAP: usize = 4;

// ---------------------------------------------------------------------------
// Per-machine scratch data
// ---------------------------------------------------------------------------

/// Scratch data owned by one approach machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApproachData {
    /// Debounce counter, reset on state entry.
    pub dwell: u8,
    /// Last sensor sample, kept for diagnostics.
    pub last_reading: u16,
}

/// Scratch data owned by one light machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightData {
    /// Debounce counter, reset on state entry.
    pub dwell: u8,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every tick function.
pub struct FsmContext<A> {
    // -- Inputs --
    /// Analog converter; sampled by the approach machines.
    pub adc: A,

    // -- Outputs --
    /// Register image flushed to the board after each pulse.
    pub outputs: OutputImage,
    /// Set once the first light initialisation has written all-red.
    pub signals_initialised: bool,

    // -- Coupling --
    /// Handshake flag pair per lane.
    pub handshakes: [Handshake; 2],

    // -- Machine scratch --
    pub approach: [ApproachData; 2],
    pub light: [LightData; 2],

    // -- Configuration --
    pub config: ControllerConfig,

    // -- Diagnostics --
    /// Machines forced back to `Init` since the last drain.
    resets: Vec<(Lane, MachineKind), RESET_LOG_CAP>,
}

impl<A: AnalogPort> FsmContext<A> {
    /// Sample `lane`'s photoresistor.  A failed conversion reads as
    /// "no car" so the approach machine stays where it is.
    pub fn sample(&mut self, lane: Lane) -> u16 {
        let channel = self.config.lanes[lane.index()].channel;
        let reading = match self.adc.read_channel(channel) {
            Ok(value) => value,
            Err(e) => {
                warn!("Lane {}: sensor read failed ({}), treating as no car", lane, e);
                FAILED_READING
            }
        };
        self.approach[lane.index()].last_reading = reading;
        reading
    }
}

impl<A> FsmContext<A> {
    /// Create a new context with all outputs dark and all flags clear.
    pub fn new(config: ControllerConfig, adc: A) -> Self {
        Self {
            adc,
            outputs: OutputImage::new(),
            signals_initialised: false,
            handshakes: [Handshake::new(); 2],
            approach: [ApproachData::default(); 2],
            light: [LightData::default(); 2],
            config,
            resets: Vec::new(),
        }
    }

    /// Record that a machine was forced back to `Init`.
    pub fn note_reset(&mut self, lane: Lane, kind: MachineKind) {
        // A full log only loses diagnostics, never behaviour.
        let _ = self.resets.push((lane, kind));
    }

    /// Take every reset recorded since the last call.
    pub fn drain_resets(&mut self) -> Vec<(Lane, MachineKind), RESET_LOG_CAP> {
        core::mem::take(&mut self.resets)
    }

    /// Handshake pair for `lane`.
    pub fn handshake(&self, lane: Lane) -> &Handshake {
        &self.handshakes[lane.index()]
    }
}
