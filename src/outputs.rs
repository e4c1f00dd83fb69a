//! In-memory image of the output registers.
//!
//! The state machines write here; the controller flushes the image to
//! the board through [`OutputPort`](crate::app::ports::OutputPort) after
//! every scheduler pulse.  Bit layout lives in [`crate::pins`].
//!
//! Ownership of the bit groups:
//!
//! | Group | Written by |
//! |---|---|
//! | lane N phase | light machine N (lane 1 init also writes lane 2) |
//! | lane N pass indicator | approach machine N (set/expire), light machine N (residual clear) |
//! | lane N position | approach machine N |

use serde::{Deserialize, Serialize};

use crate::fsm::Lane;
use crate::pins;

// ---------------------------------------------------------------------------
// Signal phase
// ---------------------------------------------------------------------------

/// Lamp shown by one lane's signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Red,
    Yellow,
    Green,
}

impl Phase {
    /// Register bit for this phase on `lane`.
    pub const fn mask(self, lane: Lane) -> u8 {
        match (self, lane) {
            (Self::Green, Lane::One) => pins::GREEN_ONE,
            (Self::Yellow, Lane::One) => pins::YELLOW_ONE,
            (Self::Red, Lane::One) => pins::RED_ONE,
            (Self::Green, Lane::Two) => pins::GREEN_TWO,
            (Self::Yellow, Lane::Two) => pins::YELLOW_TWO,
            (Self::Red, Lane::Two) => pins::RED_TWO,
        }
    }

    /// Decode a lane's phase bits.  `None` when dark or ambiguous.
    fn decode(bits: u8, lane: Lane) -> Option<Self> {
        let group = bits & group_mask(lane);
        [Self::Red, Self::Yellow, Self::Green]
            .into_iter()
            .find(|p| p.mask(lane) == group)
    }
}

const fn group_mask(lane: Lane) -> u8 {
    match lane {
        Lane::One => pins::PHASE_ONE_MASK,
        Lane::Two => pins::PHASE_TWO_MASK,
    }
}

const fn pass_mask(lane: Lane) -> u8 {
    match lane {
        Lane::One => pins::PASS_ONE,
        Lane::Two => pins::PASS_TWO,
    }
}

// ---------------------------------------------------------------------------
// Position indicator
// ---------------------------------------------------------------------------

/// Eight-lamp bar showing a vehicle's distance to the stop line.
///
/// Holds at most one set bit; all clear means no vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionIndicator(u8);

impl PositionIndicator {
    pub const CLEAR: Self = Self(0);

    /// Vehicle just sensed: lamp 0.
    pub const fn start() -> Self {
        Self(pins::POSITION_START)
    }

    /// Move one lamp toward the stop line.  The lamp at the line is
    /// terminal and stays put.
    #[must_use]
    pub const fn advance(self) -> Self {
        if self.0 == pins::POSITION_AT_LINE {
            self
        } else {
            Self(self.0 << 1)
        }
    }

    /// Whether the vehicle has reached the stop line.
    pub const fn at_line(self) -> bool {
        self.0 == pins::POSITION_AT_LINE
    }

    pub const fn is_clear(self) -> bool {
        self.0 == 0
    }

    /// Raw register value.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Register image
// ---------------------------------------------------------------------------

/// Snapshot of every output the controller drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputImage {
    signals: u8,
    positions: [PositionIndicator; 2],
}

impl OutputImage {
    pub const fn new() -> Self {
        Self {
            signals: 0,
            positions: [PositionIndicator::CLEAR; 2],
        }
    }

    /// Both lanes red, pass indicators off.
    pub fn set_all_red(&mut self) {
        self.signals = pins::ALL_RED;
    }

    /// Show `phase` on `lane`, leaving every other bit untouched.
    pub fn set_phase(&mut self, lane: Lane, phase: Phase) {
        self.signals = (self.signals & !group_mask(lane)) | phase.mask(lane);
    }

    /// Phase currently shown on `lane`, if exactly one lamp is lit.
    pub fn phase(&self, lane: Lane) -> Option<Phase> {
        Phase::decode(self.signals, lane)
    }

    pub fn set_pass(&mut self, lane: Lane) {
        self.signals |= pass_mask(lane);
    }

    pub fn clear_pass(&mut self, lane: Lane) {
        self.signals &= !pass_mask(lane);
    }

    pub fn pass(&self, lane: Lane) -> bool {
        self.signals & pass_mask(lane) != 0
    }

    pub fn position(&self, lane: Lane) -> PositionIndicator {
        self.positions[lane.index()]
    }

    pub fn set_position(&mut self, lane: Lane, position: PositionIndicator) {
        self.positions[lane.index()] = position;
    }

    /// Raw signal register value.
    pub fn signal_bits(&self) -> u8 {
        self.signals
    }
}
