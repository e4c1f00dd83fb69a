//! Controller service: the hexagonal core.
//!
//! [`Controller`] owns the task list and the shared context.  It reduces
//! the configured periods to a timer base unit, registers the four lane
//! machines and then drives them one pulse at a time.  All I/O flows
//! through port traits injected at call sites, making the whole
//! controller testable with mock adapters.
//!
//! ```text
//!  AnalogPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │        Controller          │
//!  TickSource ──▶ │  Scheduler · 4 lane FSMs   │ ──▶ OutputPort
//!                 └────────────────────────────┘
//! ```

use heapless::Vec;
use log::{info, warn};

use crate::config::ControllerConfig;
use crate::error::Result;
use crate::fsm::context::FsmContext;
use crate::fsm::{self, ApproachState, Lane, LightState, MachineKind, MachineState};
use crate::handshake::Handshake;
use crate::outputs::OutputImage;
use crate::period::{PeriodPlan, reduce_periods};
use crate::scheduler::Scheduler;

use super::events::AppEvent;
use super::ports::{AnalogPort, EventSink, OutputPort, TickSource};

/// Number of scheduled tasks: an approach and a light machine per lane.
pub const TASK_COUNT: usize = 4;

/// Task labels, in firing order.
pub const TASK_LABELS: [&str; TASK_COUNT] = ["approach-1", "light-1", "approach-2", "light-2"];

/// Task-list slot of `lane`'s machine of `kind`.
pub const fn task_index(kind: MachineKind, lane: Lane) -> usize {
    let offset = match kind {
        MachineKind::Approach => 0,
        MachineKind::Light => 1,
    };
    lane.index() * 2 + offset
}

const fn initial_state(kind: MachineKind) -> MachineState {
    match kind {
        MachineKind::Approach => MachineState::Approach(ApproachState::Init),
        MachineKind::Light => MachineState::Light(LightState::Init),
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// The intersection controller.
pub struct Controller<A> {
    scheduler: Scheduler<MachineState, FsmContext<A>, TASK_COUNT>,
    ctx: FsmContext<A>,
    plan: PeriodPlan<TASK_COUNT>,
}

impl<A: AnalogPort> Controller<A> {
    /// Validate `config`, reduce the task periods and register the four
    /// machines, each starting in `Init`.
    ///
    /// Does **not** touch the outputs; call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig, adc: A) -> Result<Self> {
        config.validate()?;
        let plan = reduce_periods(&config.periods.as_array())?;

        let entries: [(MachineKind, fsm::TickFnFor<A>); TASK_COUNT] = [
            (MachineKind::Approach, fsm::approach_lane_one::<A>),
            (MachineKind::Light, fsm::light_lane_one::<A>),
            (MachineKind::Approach, fsm::approach_lane_two::<A>),
            (MachineKind::Light, fsm::light_lane_two::<A>),
        ];

        let mut scheduler = Scheduler::new();
        for (i, (kind, tick_fn)) in entries.into_iter().enumerate() {
            scheduler.add(TASK_LABELS[i], initial_state(kind), plan.ticks[i], tick_fn)?;
        }

        Ok(Self {
            scheduler,
            ctx: FsmContext::new(config, adc),
            plan,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Flush the initial (dark) outputs and announce the base unit.
    pub fn start(&mut self, out: &mut impl OutputPort, sink: &mut impl EventSink) {
        self.flush(out);
        sink.emit(&AppEvent::Started {
            base_unit_ms: self.plan.base_unit,
        });
        info!(
            "Controller started: base unit {} ms, task ticks {:?}",
            self.plan.base_unit,
            self.plan.ticks.as_slice()
        );
    }

    // ── Per-pulse orchestration ───────────────────────────────

    /// Handle one timer pulse: run due tasks, report what changed and
    /// flush the outputs.  Returns how many tasks fired.
    pub fn pulse(&mut self, out: &mut impl OutputPort, sink: &mut impl EventSink) -> usize {
        let before: Vec<MachineState, TASK_COUNT> =
            self.scheduler.tasks().iter().map(|t| t.state).collect();

        let fired = self.scheduler.pulse(&mut self.ctx);

        for (lane, kind) in self.ctx.drain_resets() {
            sink.emit(&AppEvent::MachineReset {
                task: TASK_LABELS[task_index(kind, lane)],
                state: initial_state(kind),
            });
        }

        for (task, from) in self.scheduler.tasks().iter().zip(before) {
            if task.state != from {
                sink.emit(&AppEvent::StateChanged {
                    task: task.label,
                    from,
                    to: task.state,
                });
            }
        }

        self.flush(out);
        fired
    }

    /// Wait for and handle one pulse from `timer`.
    pub fn step(
        &mut self,
        timer: &mut impl TickSource,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let missed = timer.wait_for_pulse();
        if missed > 0 {
            warn!("Timer: {} pulse(s) missed, running late", missed);
            sink.emit(&AppEvent::PulsesMissed(missed));
        }
        self.pulse(out, sink)
    }

    /// Handle `pulses` timer pulses, then return.
    pub fn run_for(
        &mut self,
        pulses: u64,
        timer: &mut impl TickSource,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        for _ in 0..pulses {
            self.step(timer, out, sink);
        }
    }

    /// The main loop.  Never returns.
    pub fn run(
        &mut self,
        timer: &mut impl TickSource,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> ! {
        loop {
            self.step(timer, out, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Timer period in milliseconds.
    pub fn base_unit(&self) -> u32 {
        self.plan.base_unit
    }

    /// Per-task periods in base units, in firing order.
    pub fn task_ticks(&self) -> &[u32] {
        &self.plan.ticks
    }

    /// State of the task at `index`.
    pub fn state(&self, index: usize) -> Option<MachineState> {
        self.scheduler.state(index)
    }

    pub fn approach_state(&self, lane: Lane) -> Option<ApproachState> {
        match self.scheduler.state(task_index(MachineKind::Approach, lane)) {
            Some(MachineState::Approach(s)) => Some(s),
            _ => None,
        }
    }

    pub fn light_state(&self, lane: Lane) -> Option<LightState> {
        match self.scheduler.state(task_index(MachineKind::Light, lane)) {
            Some(MachineState::Light(s)) => Some(s),
            _ => None,
        }
    }

    /// Current register image.
    pub fn outputs(&self) -> &OutputImage {
        &self.ctx.outputs
    }

    pub fn handshake(&self, lane: Lane) -> Handshake {
        *self.ctx.handshake(lane)
    }

    /// Pulses handled since construction.
    pub fn pulse_count(&self) -> u64 {
        self.scheduler.pulse_count()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.ctx.config
    }

    /// The shared context, for diagnostics.
    pub fn context(&self) -> &FsmContext<A> {
        &self.ctx
    }

    /// The analog input, e.g. to change a simulated reading.
    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.ctx.adc
    }

    /// Overwrite the state of the task at `index`.  A state of the wrong
    /// machine kind is accepted here and corrected by the task on its
    /// next invocation.
    pub fn restore_state(&mut self, index: usize, state: MachineState) {
        self.scheduler.set_state(index, state);
    }

    // ── Internal ──────────────────────────────────────────────

    fn flush(&self, out: &mut impl OutputPort) {
        if let Err(e) = out.apply(&self.ctx.outputs) {
            warn!("Output flush failed: {}", e);
        }
    }
}
