//! Host simulation adapters.
//!
//! [`ScriptedAnalog`] stands in for the photoresistor converter and
//! [`RecordingOutputs`] for the lamp registers, so the controller can run
//! on a desktop or in the test suite without a board.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::app::ports::{AnalogPort, OutputPort};
use crate::error::{AdcError, Result};
use crate::fsm::Lane;
use crate::outputs::{OutputImage, Phase};

/// Channels the simulated multiplexer offers.
pub const SIM_CHANNELS: usize = 8;

/// Reading of an uncovered photoresistor.
pub const DAYLIGHT: u16 = 0x50;

// ───────────────────────────────────────────────────────────────
// Analog input
// ───────────────────────────────────────────────────────────────

/// Analog converter fed from per-channel scripts.
///
/// Each read pops the next scripted value; once a script runs dry the
/// channel keeps returning its last value.
pub struct ScriptedAnalog {
    scripts: [VecDeque<u16>; SIM_CHANNELS],
    hold: [u16; SIM_CHANNELS],
    reads: [u32; SIM_CHANNELS],
}

impl ScriptedAnalog {
    /// Every channel reads `level` until scripted otherwise.
    pub fn new(level: u16) -> Self {
        Self {
            scripts: core::array::from_fn(|_| VecDeque::new()),
            hold: [level; SIM_CHANNELS],
            reads: [0; SIM_CHANNELS],
        }
    }

    /// Drop any script on `channel` and hold it at `level`.
    pub fn set(&mut self, channel: u8, level: u16) {
        if let Some(i) = Self::slot(channel) {
            self.scripts[i].clear();
            self.hold[i] = level;
        }
    }

    /// Queue `levels` for the next reads of `channel`.
    pub fn push(&mut self, channel: u8, levels: impl IntoIterator<Item = u16>) {
        if let Some(i) = Self::slot(channel) {
            self.scripts[i].extend(levels);
        }
    }

    /// Queue `count` reads of `level` on `channel`.
    pub fn push_repeat(&mut self, channel: u8, level: u16, count: usize) {
        self.push(channel, core::iter::repeat_n(level, count));
    }

    /// Reads served on `channel` so far.
    pub fn reads(&self, channel: u8) -> u32 {
        Self::slot(channel).map_or(0, |i| self.reads[i])
    }

    fn slot(channel: u8) -> Option<usize> {
        let i = usize::from(channel);
        (i < SIM_CHANNELS).then_some(i)
    }
}

impl Default for ScriptedAnalog {
    fn default() -> Self {
        Self::new(DAYLIGHT)
    }
}

impl AnalogPort for ScriptedAnalog {
    fn read_channel(&mut self, channel: u8) -> core::result::Result<u16, AdcError> {
        let i = Self::slot(channel).ok_or(AdcError::InvalidChannel { channel })?;
        if let Some(level) = self.scripts[i].pop_front() {
            self.hold[i] = level;
        }
        self.reads[i] += 1;
        Ok(self.hold[i])
    }
}

// ───────────────────────────────────────────────────────────────
// Outputs
// ───────────────────────────────────────────────────────────────

/// Output port that remembers every distinct register image it was given.
#[derive(Debug, Default)]
pub struct RecordingOutputs {
    frames: Vec<OutputImage>,
    flushes: u64,
}

impl RecordingOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct images in the order they were applied.
    pub fn frames(&self) -> &[OutputImage] {
        &self.frames
    }

    /// Most recent image, if any flush happened.
    pub fn current(&self) -> Option<&OutputImage> {
        self.frames.last()
    }

    /// Total flushes, including ones that changed nothing.
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Phases shown on `lane` with consecutive repeats collapsed.
    /// Dark frames are skipped.
    pub fn phase_sequence(&self, lane: Lane) -> Vec<Phase> {
        let mut seq: Vec<Phase> = Vec::new();
        for phase in self.frames.iter().filter_map(|f| f.phase(lane)) {
            if seq.last() != Some(&phase) {
                seq.push(phase);
            }
        }
        seq
    }
}

impl OutputPort for RecordingOutputs {
    fn apply(&mut self, image: &OutputImage) -> Result<()> {
        self.flushes += 1;
        if self.frames.last() != Some(image) {
            self.frames.push(*image);
        }
        Ok(())
    }
}
