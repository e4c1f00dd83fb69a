//! Peripheral drivers: the analog converter and the base-unit timer.

pub mod adc;
pub mod tick_timer;
