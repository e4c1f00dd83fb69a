//! Lane state machines and their scheduler entry points.
//!
//! Four machines run under the cooperative scheduler, two per lane:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  lane 1:  ApproachFsm ──[approach_ready]──▶ LightFsm         │
//! │                       ◀──[go_granted]─────                   │
//! │  lane 2:  ApproachFsm ──[approach_ready]──▶ LightFsm         │
//! │                       ◀──[go_granted]─────                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each invocation runs the machine's transition step followed by the
//! action of the state it lands in.  Every task holds a [`MachineState`];
//! a tick function handed a state of the wrong machine kind (or a state
//! code that decodes to nothing) logs the fault and restarts its machine
//! from `Init` instead of guessing.

pub mod approach;
pub mod context;
pub mod light;

use core::fmt;

use log::{info, warn};

use crate::app::ports::AnalogPort;
use crate::scheduler::TickFn;
pub use approach::ApproachState;
use context::FsmContext;
pub use light::LightState;

// ---------------------------------------------------------------------------
// Lane identity
// ---------------------------------------------------------------------------

/// One of the two approaches to the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    One,
    Two,
}

impl Lane {
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Array index for per-lane storage.
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "1"),
            Self::Two => write!(f, "2"),
        }
    }
}

/// Which of the two machine families a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineKind {
    Approach,
    Light,
}

// ---------------------------------------------------------------------------
// Task state
// ---------------------------------------------------------------------------

/// State carried by a scheduler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Approach(ApproachState),
    Light(LightState),
}

impl MachineState {
    /// Decode a signed state code for the given machine kind.
    pub fn from_code(kind: MachineKind, code: i8) -> Option<Self> {
        match kind {
            MachineKind::Approach => ApproachState::from_code(code).map(Self::Approach),
            MachineKind::Light => LightState::from_code(code).map(Self::Light),
        }
    }

    /// Signed state code, as exposed to diagnostics.
    pub fn code(self) -> i8 {
        match self {
            Self::Approach(s) => s.code(),
            Self::Light(s) => s.code(),
        }
    }

    pub fn kind(self) -> MachineKind {
        match self {
            Self::Approach(_) => MachineKind::Approach,
            Self::Light(_) => MachineKind::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Approach(s) => s.name(),
            Self::Light(s) => s.name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tick dispatch
// ---------------------------------------------------------------------------

/// Advance `lane`'s approach machine by one invocation.
pub fn tick_approach<A: AnalogPort>(
    lane: Lane,
    state: MachineState,
    ctx: &mut FsmContext<A>,
) -> MachineState {
    let MachineState::Approach(current) = state else {
        return reset(lane, MachineKind::Approach, state, ctx);
    };
    let next = approach::step(lane, current, ctx);
    if next != current {
        info!("FSM transition [approach {}]: {} -> {}", lane, current.name(), next.name());
    }
    MachineState::Approach(next)
}

/// Advance `lane`'s light machine by one invocation.
pub fn tick_light<A>(lane: Lane, state: MachineState, ctx: &mut FsmContext<A>) -> MachineState {
    let MachineState::Light(current) = state else {
        return reset(lane, MachineKind::Light, state, ctx);
    };
    let next = light::step(lane, current, ctx);
    if next != current {
        info!("FSM transition [light {}]: {} -> {}", lane, current.name(), next.name());
    }
    MachineState::Light(next)
}

fn reset<A>(
    lane: Lane,
    kind: MachineKind,
    found: MachineState,
    ctx: &mut FsmContext<A>,
) -> MachineState {
    warn!(
        "FSM reset [{:?} {}]: unexpected state {} (code {}), restarting from Init",
        kind,
        lane,
        found.name(),
        found.code()
    );
    ctx.note_reset(lane, kind);
    match kind {
        MachineKind::Approach => MachineState::Approach(ApproachState::Init),
        MachineKind::Light => MachineState::Light(LightState::Init),
    }
}

// Scheduler entry points, one per task.

/// Tick function type of every lane task.
pub type TickFnFor<A> = TickFn<MachineState, FsmContext<A>>;

pub fn approach_lane_one<A: AnalogPort>(s: MachineState, ctx: &mut FsmContext<A>) -> MachineState {
    tick_approach(Lane::One, s, ctx)
}

pub fn light_lane_one<A>(s: MachineState, ctx: &mut FsmContext<A>) -> MachineState {
    tick_light(Lane::One, s, ctx)
}

pub fn approach_lane_two<A: AnalogPort>(s: MachineState, ctx: &mut FsmContext<A>) -> MachineState {
    tick_approach(Lane::Two, s, ctx)
}

pub fn light_lane_two<A>(s: MachineState, ctx: &mut FsmContext<A>) -> MachineState {
    tick_light(Lane::Two, s, ctx)
}
