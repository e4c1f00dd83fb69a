//! Controller configuration parameters
//!
//! All tunable parameters for the intersection: task periods, per-lane
//! sensor calibration and the dwell constants of both state machines.
//! Loaded once at startup; there is no runtime reconfiguration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Task periods in milliseconds (reduced to scheduler ticks at startup).
    pub periods: TaskPeriods,
    /// Photoresistor calibration, indexed by lane (lane 1 first).
    pub lanes: [LaneCalibration; 2],
    /// Minimum dwell counts for the state machines.
    pub dwell: DwellConfig,
}

/// Period of every task, in list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPeriods {
    pub approach_one: u32,
    pub light_one: u32,
    pub approach_two: u32,
    pub light_two: u32,
}

impl TaskPeriods {
    /// Periods in scheduler list order.
    pub fn as_array(&self) -> [u32; 4] {
        [
            self.approach_one,
            self.light_one,
            self.approach_two,
            self.light_two,
        ]
    }
}

/// Photoresistor calibration for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneCalibration {
    /// Analog channel the lane's photoresistor is wired to.
    pub channel: u8,
    /// Lowest reading observed with the sensor uncovered.
    pub min_reading: u16,
    /// Margin above `min_reading` below which a car counts as present.
    pub margin: u16,
}

impl LaneCalibration {
    /// Readings strictly below this value mean "car present".
    pub fn threshold(&self) -> u16 {
        self.min_reading.saturating_add(self.margin)
    }
}

/// Dwell constants, all in ticks of the owning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DwellConfig {
    /// Idle ticks after which the approach machine clears the pass indicator.
    /// At most 254.
    pub pass_indicator_ticks: u8,
    /// Minimum ticks a vehicle holds at the stop line before requesting.
    pub hold_at_line_ticks: u8,
    /// Ticks the light machine debounces a request before granting.
    pub grant_debounce_ticks: u8,
    /// Ticks green stays on after the grant is published.
    pub green_ticks: u8,
    /// Ticks yellow stays on before returning to red.
    pub yellow_ticks: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            periods: TaskPeriods {
                approach_one: 50,
                light_one: 500,
                approach_two: 50,
                light_two: 500,
            },
            lanes: [
                LaneCalibration {
                    channel: 0,
                    min_reading: 0x30,
                    margin: 0x05,
                },
                LaneCalibration {
                    channel: 6,
                    min_reading: 0x30,
                    margin: 0x05,
                },
            ],
            dwell: DwellConfig {
                pass_indicator_ticks: 10,
                hold_at_line_ticks: 10,
                grant_debounce_ticks: 2,
                green_ticks: 4,
                yellow_ticks: 4,
            },
        }
    }
}

impl ControllerConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| {
            log::warn!("Config parse failed: {}", e);
            ConfigError::Parse
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.  Out-of-range values
    /// are refused, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.periods.as_array().contains(&0) {
            return Err(ConfigError::ValidationFailed(
                "periods: every task period must be positive",
            ));
        }
        if self.dwell.pass_indicator_ticks == u8::MAX {
            return Err(ConfigError::ValidationFailed(
                "dwell.pass_indicator_ticks must be below 255",
            ));
        }
        if self.dwell.green_ticks == 0 {
            return Err(ConfigError::ValidationFailed("dwell.green_ticks must be positive"));
        }
        if self.dwell.yellow_ticks == 0 {
            return Err(ConfigError::ValidationFailed("dwell.yellow_ticks must be positive"));
        }
        if self.lanes[0].channel == self.lanes[1].channel {
            return Err(ConfigError::ValidationFailed(
                "lanes: both lanes read the same analog channel",
            ));
        }
        Ok(())
    }
}
