//! Output register bit assignments for the intersection board.
//!
//! Single source of truth: the FSMs and output adapters reference these
//! masks rather than hard-coding bit positions.
//!
//! ```text
//!  signal register   7      6      5    4    3    2    1    0
//!                  PASS2  PASS1   R2   Y2   G2   R1   Y1   G1
//! ```

// ---------------------------------------------------------------------------
// Lane 1 phase group
// ---------------------------------------------------------------------------

pub const GREEN_ONE: u8 = 0b0000_0001;
pub const YELLOW_ONE: u8 = 0b0000_0010;
pub const RED_ONE: u8 = 0b0000_0100;
/// All three lane-1 phase bits.
pub const PHASE_ONE_MASK: u8 = GREEN_ONE | YELLOW_ONE | RED_ONE;

// ---------------------------------------------------------------------------
// Lane 2 phase group
// ---------------------------------------------------------------------------

pub const GREEN_TWO: u8 = 0b0000_1000;
pub const YELLOW_TWO: u8 = 0b0001_0000;
pub const RED_TWO: u8 = 0b0010_0000;
/// All three lane-2 phase bits.
pub const PHASE_TWO_MASK: u8 = GREEN_TWO | YELLOW_TWO | RED_TWO;

// ---------------------------------------------------------------------------
// Pass indicators (one per lane)
// ---------------------------------------------------------------------------

pub const PASS_ONE: u8 = 0b0100_0000;
pub const PASS_TWO: u8 = 0b1000_0000;

/// Value written by the light initialisation: both lanes red, indicators off.
pub const ALL_RED: u8 = RED_ONE | RED_TWO;

// ---------------------------------------------------------------------------
// Position indicators
// ---------------------------------------------------------------------------

/// Position register value when a vehicle is first sensed.
pub const POSITION_START: u8 = 0b0000_0001;
/// Position register value when the vehicle has reached the stop line.
pub const POSITION_AT_LINE: u8 = 0b1000_0000;
