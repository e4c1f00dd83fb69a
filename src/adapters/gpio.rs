//! GPIO output adapter.
//!
//! Implements [`OutputPort`] over `embedded-hal` [`OutputPin`]s.  Each
//! 8-bit register of the [`OutputImage`] maps to a bank of eight pins,
//! bit 0 on the first pin.  A bank is only rewritten when its register
//! value changed since the last successful flush.

use embedded_hal::digital::{OutputPin, PinState};
use log::debug;

use crate::app::ports::OutputPort;
use crate::error::{Error, Result};
use crate::fsm::Lane;
use crate::outputs::OutputImage;

/// Eight pins driven together as one register.
pub struct PinBank<P> {
    pins: [P; 8],
    last: Option<u8>,
}

impl<P: OutputPin> PinBank<P> {
    pub fn new(pins: [P; 8]) -> Self {
        Self { pins, last: None }
    }

    /// Drive every pin to its bit of `bits`.  Skipped when unchanged.
    pub fn write(&mut self, bits: u8) -> Result<()> {
        if self.last == Some(bits) {
            return Ok(());
        }
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            pin.set_state(PinState::from(bits & (1 << bit) != 0))
                .map_err(|_| Error::Output("gpio pin write failed"))?;
        }
        self.last = Some(bits);
        Ok(())
    }

    /// The underlying pins, in bit order.
    pub fn pins(&self) -> &[P; 8] {
        &self.pins
    }
}

/// Signal register plus one position register per lane.
pub struct GpioOutputs<P> {
    signals: PinBank<P>,
    positions: [PinBank<P>; 2],
}

impl<P: OutputPin> GpioOutputs<P> {
    pub fn new(signals: [P; 8], lane_one: [P; 8], lane_two: [P; 8]) -> Self {
        Self {
            signals: PinBank::new(signals),
            positions: [PinBank::new(lane_one), PinBank::new(lane_two)],
        }
    }

    pub fn signals(&self) -> &PinBank<P> {
        &self.signals
    }

    pub fn position(&self, lane: Lane) -> &PinBank<P> {
        &self.positions[lane.index()]
    }
}

impl<P: OutputPin> OutputPort for GpioOutputs<P> {
    fn apply(&mut self, image: &OutputImage) -> Result<()> {
        self.signals.write(image.signal_bits())?;
        for lane in Lane::ALL {
            self.positions[lane.index()].write(image.position(lane).bits())?;
        }
        debug!(
            "GPIO: signals={:#04x} pos1={:#04x} pos2={:#04x}",
            image.signal_bits(),
            image.position(Lane::One).bits(),
            image.position(Lane::Two).bits()
        );
        Ok(())
    }
}
