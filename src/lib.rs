//! Two-lane photoresistor intersection controller.
//!
//! A cooperative time-triggered scheduler drives four state machines:
//! per lane, an approach machine that tracks a vehicle up to the stop
//! line and a light machine that grants it right-of-way.  Hardware is
//! reached only through the port traits in [`app::ports`], so everything
//! here runs on host and in tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod handshake;
pub mod outputs;
pub mod period;
pub mod pins;
pub mod scheduler;
