//! Polled analog-to-digital converter driver.
//!
//! The converter is started by software and polled until its busy flag
//! drops.  The poll is bounded: a conversion that does not finish within
//! `max_polls` spins is abandoned with [`AdcError::Timeout`], so the
//! worst-case latency of a read is known.
//!
//! ## Dual-target design
//!
//! The register block is abstracted behind [`ConversionRegisters`].  On a
//! board it wraps the memory-mapped ADC; on host and in tests it is a
//! plain struct.

use log::warn;

use crate::app::ports::AnalogPort;
use crate::error::AdcError;

/// Default bound on busy-flag polls per conversion.
pub const DEFAULT_MAX_POLLS: u32 = 1_000;

/// The control and data registers of a single-conversion ADC.
pub trait ConversionRegisters {
    /// Number of input channels the multiplexer can select.
    fn channel_count(&self) -> u8;

    /// Route `channel` to the converter.
    fn select_channel(&mut self, channel: u8);

    /// Begin one conversion on the selected channel.
    fn start_conversion(&mut self);

    /// Whether the conversion started last is still running.
    fn is_busy(&mut self) -> bool;

    /// Result of the last completed conversion.
    fn result(&self) -> u16;
}

pub struct PolledAdc<R> {
    regs: R,
    max_polls: u32,
}

impl<R: ConversionRegisters> PolledAdc<R> {
    pub fn new(regs: R) -> Self {
        Self::with_max_polls(regs, DEFAULT_MAX_POLLS)
    }

    pub fn with_max_polls(regs: R, max_polls: u32) -> Self {
        Self { regs, max_polls }
    }

    /// Borrow the register block.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }
}

impl<R: ConversionRegisters> AnalogPort for PolledAdc<R> {
    fn read_channel(&mut self, channel: u8) -> Result<u16, AdcError> {
        if channel >= self.regs.channel_count() {
            return Err(AdcError::InvalidChannel { channel });
        }

        self.regs.select_channel(channel);
        self.regs.start_conversion();

        let mut polls = 0;
        while self.regs.is_busy() {
            if polls >= self.max_polls {
                warn!("ADC: channel {} still busy after {} polls", channel, polls);
                return Err(AdcError::Timeout { channel });
            }
            polls += 1;
            core::hint::spin_loop();
        }

        Ok(self.regs.result())
    }
}
