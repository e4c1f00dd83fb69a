//! Mock hardware adapters for integration tests.
//!
//! Records every output flush and event so tests can assert on the full
//! history without touching real registers.

use intersection::app::events::AppEvent;
use intersection::app::ports::{AnalogPort, EventSink, OutputPort, TickSource};
use intersection::app::service::Controller;
use intersection::config::ControllerConfig;
use intersection::error::{AdcError, Result};
use intersection::fsm::Lane;
use intersection::outputs::{OutputImage, Phase};

pub const NO_CAR: u16 = 0x50;
pub const CAR: u16 = 0x20;

// ── Analog input ──────────────────────────────────────────────

/// Every channel holds a level until the test changes it.
pub struct MockAnalog {
    pub levels: [u16; 8],
    pub failing: [bool; 8],
}

#[allow(dead_code)]
impl MockAnalog {
    pub fn new() -> Self {
        Self {
            levels: [NO_CAR; 8],
            failing: [false; 8],
        }
    }
}

impl AnalogPort for MockAnalog {
    fn read_channel(&mut self, channel: u8) -> core::result::Result<u16, AdcError> {
        let i = channel as usize;
        match (self.levels.get(i), self.failing.get(i)) {
            (Some(_), Some(true)) => Err(AdcError::Timeout { channel }),
            (Some(level), _) => Ok(*level),
            _ => Err(AdcError::InvalidChannel { channel }),
        }
    }
}

// ── Outputs ───────────────────────────────────────────────────

/// Keeps one image per flush.
#[derive(Default)]
pub struct MockOutputs {
    pub flushes: Vec<OutputImage>,
}

#[allow(dead_code)]
impl MockOutputs {
    pub fn last(&self) -> OutputImage {
        self.flushes.last().copied().unwrap_or_default()
    }

    /// Phase of `lane` at every flush.
    pub fn phases(&self, lane: Lane) -> Vec<Option<Phase>> {
        self.flushes.iter().map(|f| f.phase(lane)).collect()
    }

    /// Phase changes of `lane`, consecutive repeats collapsed.
    pub fn phase_changes(&self, lane: Lane) -> Vec<Phase> {
        let mut seq = Vec::new();
        for phase in self.phases(lane).into_iter().flatten() {
            if seq.last() != Some(&phase) {
                seq.push(phase);
            }
        }
        seq
    }
}

impl OutputPort for MockOutputs {
    fn apply(&mut self, image: &OutputImage) -> Result<()> {
        self.flushes.push(*image);
        Ok(())
    }
}

// ── Events ────────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Timer ─────────────────────────────────────────────────────

/// Pulse source returning a scripted missed count per wait.
#[derive(Default)]
pub struct ScriptedTimer {
    pub missed: Vec<u32>,
    pub waits: usize,
}

impl TickSource for ScriptedTimer {
    fn wait_for_pulse(&mut self) -> u32 {
        let missed = self.missed.get(self.waits).copied().unwrap_or(0);
        self.waits += 1;
        missed
    }
}

// ── Harness ───────────────────────────────────────────────────

pub struct Rig {
    pub ctl: Controller<MockAnalog>,
    pub out: MockOutputs,
    pub log: EventLog,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        let mut rig = Self {
            ctl: Controller::new(config, MockAnalog::new()).expect("valid config"),
            out: MockOutputs::default(),
            log: EventLog::default(),
        };
        rig.ctl.start(&mut rig.out, &mut rig.log);
        rig
    }

    pub fn pulse(&mut self) {
        self.ctl.pulse(&mut self.out, &mut self.log);
    }

    pub fn pulses(&mut self, n: usize) {
        for _ in 0..n {
            self.pulse();
        }
    }

    /// Set the reading of `lane`'s sensor.
    pub fn sensor(&mut self, lane: Lane, level: u16) {
        let channel = self.ctl.config().lanes[lane.index()].channel as usize;
        self.ctl.adc_mut().levels[channel] = level;
    }

    /// Pulse until `done` holds, at most `limit` times.  Returns the
    /// number of pulses taken.
    pub fn pulse_until(&mut self, limit: usize, done: impl Fn(&Self) -> bool) -> Option<usize> {
        for n in 1..=limit {
            self.pulse();
            if done(self) {
                return Some(n);
            }
        }
        None
    }
}
