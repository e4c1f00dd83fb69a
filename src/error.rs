//! Unified error types for the intersection controller.
//!
//! Only startup can fail: configuration, period reduction and task
//! registration.  The tick path is infallible; sensor and timer anomalies
//! are absorbed and logged where they happen.  All variants are `Copy` so
//! they pass through `Controller::new` without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// Task periods could not be reduced to a base unit.
    Period(PeriodError),
    /// The task list rejected a registration.
    Scheduler(SchedulerError),
    /// Writing an output register failed.
    Output(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Period(e) => write!(f, "period: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
            Self::Output(msg) => write!(f, "output: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document could not be deserialised.
    Parse,
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "malformed config document"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Period reduction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodError {
    /// No periods were supplied.
    Empty,
    /// The period at `index` is zero; Euclidean reduction is undefined.
    ZeroPeriod { index: usize },
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no task periods"),
            Self::ZeroPeriod { index } => write!(f, "task {index} has a zero period"),
        }
    }
}

impl From<PeriodError> for Error {
    fn from(e: PeriodError) -> Self {
        Self::Period(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The fixed-size task list is full.
    Full { capacity: usize },
    /// A task was registered with a zero tick count.
    ZeroPeriod,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "task list full ({capacity} slots)"),
            Self::ZeroPeriod => write!(f, "task period must be at least one tick"),
        }
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// ADC errors
// ---------------------------------------------------------------------------

/// Returned by [`AnalogPort::read_channel`](crate::app::ports::AnalogPort::read_channel).
/// Never escalated: the approach machine logs it and reads "no car".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcError {
    /// The conversion-complete bit never cleared within the poll budget.
    Timeout { channel: u8 },
    /// The requested channel does not exist on this converter.
    InvalidChannel { channel: u8 },
}

impl fmt::Display for AdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { channel } => write!(f, "conversion timeout on channel {channel}"),
            Self::InvalidChannel { channel } => write!(f, "no such channel {channel}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
