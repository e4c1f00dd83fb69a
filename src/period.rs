//! Period reduction.
//!
//! The scheduler only distinguishes multiples of one base unit: the
//! greatest common divisor of every task period.  Each task then fires
//! every `period / base_unit` timer pulses.

use heapless::Vec;
use log::info;

use crate::error::PeriodError;

/// Greatest common divisor by repeated remainder.
///
/// `b` must be non-zero.
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    loop {
        let c = a % b;
        if c == 0 {
            return b;
        }
        a = b;
        b = c;
    }
}

/// Result of reducing a set of task periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodPlan<const N: usize> {
    /// Greatest common divisor of all periods; the hardware timer interval.
    pub base_unit: u32,
    /// Per-task tick counts, `period / base_unit`, in input order.
    pub ticks: Vec<u32, N>,
}

/// Fold `gcd` across every period and derive per-task tick counts.
pub fn reduce_periods<const N: usize>(periods: &[u32; N]) -> Result<PeriodPlan<N>, PeriodError> {
    if let Some(index) = periods.iter().position(|&p| p == 0) {
        return Err(PeriodError::ZeroPeriod { index });
    }
    let (first, rest) = periods.split_first().ok_or(PeriodError::Empty)?;
    let base_unit = rest.iter().fold(*first, |acc, &p| gcd(acc, p));

    let ticks = periods.iter().map(|&p| p / base_unit).collect();
    info!("Period reducer: base unit {} from {:?}", base_unit, periods);

    Ok(PeriodPlan { base_unit, ticks })
}
