//! Application core: pure domain logic, zero I/O.
//!
//! The [`service::Controller`] wires the period reducer, the scheduler
//! and the four lane machines together.  All interaction with hardware
//! happens through the **port traits** in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
