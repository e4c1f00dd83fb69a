//! Approach machine: detects a vehicle and walks it up to the stop line.
//!
//! ```text
//!  INIT ──▶ IDLE ──[reading < threshold]──▶ SENSED ──▶ ADVANCING ─┐
//!            ▲                                         (shift ×7)  │
//!            │                                                     ▼
//!            └──[go_granted]── WAITING_FOR_GRANT ◀──[dwell]── HOLDING_AT_LINE
//! ```
//!
//! The photoresistor is sampled on every invocation.  While waiting for
//! the grant the machine re-asserts `approach_ready` each tick; once the
//! light grants passage the vehicle clears, the pass indicator lights and
//! the request is withdrawn.

use log::{debug, warn};

use super::Lane;
use super::context::FsmContext;
use crate::app::ports::AnalogPort;
use crate::outputs::PositionIndicator;

/// States of the approach machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum ApproachState {
    Init = 0,
    Idle = 1,
    Sensed = 2,
    Advancing = 3,
    HoldingAtLine = 4,
    WaitingForGrant = 5,
}

impl ApproachState {
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Self::Init),
            1 => Some(Self::Idle),
            2 => Some(Self::Sensed),
            3 => Some(Self::Advancing),
            4 => Some(Self::HoldingAtLine),
            5 => Some(Self::WaitingForGrant),
            _ => None,
        }
    }

    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Idle => "Idle",
            Self::Sensed => "Sensed",
            Self::Advancing => "Advancing",
            Self::HoldingAtLine => "HoldingAtLine",
            Self::WaitingForGrant => "WaitingForGrant",
        }
    }
}

/// One invocation: sample, transition, then act.
pub fn step<A: AnalogPort>(
    lane: Lane,
    state: ApproachState,
    ctx: &mut FsmContext<A>,
) -> ApproachState {
    let reading = ctx.sample(lane);
    let next = transition(lane, state, reading, ctx);
    act(lane, next, ctx);
    next
}

fn transition<A>(
    lane: Lane,
    state: ApproachState,
    reading: u16,
    ctx: &mut FsmContext<A>,
) -> ApproachState {
    let i = lane.index();
    let threshold = ctx.config.lanes[i].threshold();
    let dwell_cfg = ctx.config.dwell;
    let data = &mut ctx.approach[i];

    match state {
        ApproachState::Init => {
            data.dwell = 0;
            ctx.outputs.set_position(lane, PositionIndicator::CLEAR);
            ctx.handshakes[i].approach().withdraw();
            ApproachState::Idle
        }
        ApproachState::Idle => {
            // Keep the pass lamp lit for a while after the last vehicle.
            if data.dwell > dwell_cfg.pass_indicator_ticks {
                ctx.outputs.clear_pass(lane);
            }
            data.dwell = data.dwell.saturating_add(1);
            if reading < threshold {
                debug!("Lane {}: car sensed (reading {:#04x} < {:#04x})", lane, reading, threshold);
                data.dwell = 0;
                ApproachState::Sensed
            } else {
                ApproachState::Idle
            }
        }
        ApproachState::Sensed => ApproachState::Advancing,
        ApproachState::Advancing => {
            let position = ctx.outputs.position(lane);
            if position.is_clear() {
                warn!("Lane {}: advancing with no position lamp, reinitialising", lane);
                ApproachState::Init
            } else if position.at_line() {
                data.dwell = 0;
                ApproachState::HoldingAtLine
            } else {
                ApproachState::Advancing
            }
        }
        ApproachState::HoldingAtLine => {
            let next = if data.dwell < dwell_cfg.hold_at_line_ticks {
                ApproachState::HoldingAtLine
            } else {
                ApproachState::WaitingForGrant
            };
            data.dwell = data.dwell.saturating_add(1);
            next
        }
        ApproachState::WaitingForGrant => {
            if ctx.handshakes[i].approach().is_granted() {
                ctx.outputs.set_position(lane, PositionIndicator::CLEAR);
                ctx.outputs.set_pass(lane);
                ctx.handshakes[i].approach().withdraw();
                data.dwell = 0;
                debug!("Lane {}: vehicle cleared the intersection", lane);
                ApproachState::Idle
            } else {
                ApproachState::WaitingForGrant
            }
        }
    }
}

fn act<A>(lane: Lane, state: ApproachState, ctx: &mut FsmContext<A>) {
    match state {
        ApproachState::Init | ApproachState::Idle | ApproachState::HoldingAtLine => {}
        ApproachState::Sensed => {
            ctx.outputs.set_position(lane, PositionIndicator::start());
        }
        ApproachState::Advancing => {
            let position = ctx.outputs.position(lane).advance();
            debug!("Lane {}: position {:#010b}", lane, position.bits());
            ctx.outputs.set_position(lane, position);
        }
        ApproachState::WaitingForGrant => {
            ctx.handshakes[lane.index()].approach().request();
        }
    }
}
