//! Light machine: grants right-of-way with a green/yellow/red sequence.
//!
//! ```text
//!  INIT ──▶ IDLE ──[approach_ready, debounce]──▶ GRANT (green on)
//!            ▲                                     │
//!            │                                     ▼
//!            │                                   HOLD (go_granted set)
//!            │                                     │
//!            │                                     ▼
//!            └──[dwell, red on, revoke]── YIELD ◀──[dwell, yellow on]── EXTENDED_HOLD
//! ```
//!
//! Once a request has been observed in Idle the debounce is committed:
//! the machine proceeds to Grant when the count is reached even if the
//! request dropped in between.

use log::{debug, info};

use super::Lane;
use super::context::FsmContext;
use crate::outputs::Phase;

/// States of the light machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum LightState {
    Init = 0,
    Idle = 1,
    Grant = 2,
    Hold = 3,
    ExtendedHold = 4,
    YieldPhase = 5,
}

impl LightState {
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(Self::Init),
            1 => Some(Self::Idle),
            2 => Some(Self::Grant),
            3 => Some(Self::Hold),
            4 => Some(Self::ExtendedHold),
            5 => Some(Self::YieldPhase),
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
            Self::Grant => "Grant",
            Self::Hold => "Hold",
            Self::ExtendedHold => "ExtendedHold",
            Self::YieldPhase => "YieldPhase",
        }
    }
}

/// One invocation: transition, then act.
pub fn step<A>(lane: Lane, state: LightState, ctx: &mut FsmContext<A>) -> LightState {
    let next = transition(lane, state, ctx);
    act(lane, next, ctx);
    next
}

fn transition<A>(lane: Lane, state: LightState, ctx: &mut FsmContext<A>) -> LightState {
    let i = lane.index();
    let dwell_cfg = ctx.config.dwell;
    let data = &mut ctx.light[i];

    match state {
        LightState::Init => {
            if ctx.signals_initialised {
                ctx.outputs.set_phase(lane, Phase::Red);
            } else {
                info!("Light {}: all signals red", lane);
                ctx.outputs.set_all_red();
                ctx.signals_initialised = true;
            }
            ctx.handshakes[i].light().revoke();
            data.dwell = 0;
            LightState::Idle
        }
        LightState::Idle => {
            let counting = data.dwell > 0 || ctx.handshakes[i].light().is_requested();
            if !counting {
                LightState::Idle
            } else if data.dwell >= dwell_cfg.grant_debounce_ticks {
                LightState::Grant
            } else {
                data.dwell += 1;
                debug!("Light {}: request debounce {}", lane, data.dwell);
                LightState::Idle
            }
        }
        LightState::Grant => LightState::Hold,
        LightState::Hold => {
            ctx.outputs.clear_pass(lane);
            data.dwell = 0;
            LightState::ExtendedHold
        }
        LightState::ExtendedHold => {
            if data.dwell < dwell_cfg.green_ticks {
                data.dwell += 1;
                LightState::ExtendedHold
            } else {
                ctx.outputs.set_phase(lane, Phase::Yellow);
                data.dwell = 0;
                LightState::YieldPhase
            }
        }
        LightState::YieldPhase => {
            // The entry tick already shows yellow.
            if data.dwell + 1 < dwell_cfg.yellow_ticks {
                data.dwell += 1;
                LightState::YieldPhase
            } else {
                ctx.outputs.set_phase(lane, Phase::Red);
                ctx.handshakes[i].light().revoke();
                data.dwell = 0;
                LightState::Idle
            }
        }
    }
}

fn act<A>(lane: Lane, state: LightState, ctx: &mut FsmContext<A>) {
    match state {
        LightState::Init
        | LightState::Idle
        | LightState::ExtendedHold
        | LightState::YieldPhase => {}
        LightState::Grant => ctx.outputs.set_phase(lane, Phase::Green),
        LightState::Hold => ctx.handshakes[lane.index()].light().grant(),
    }
}
