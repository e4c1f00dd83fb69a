//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured controller events to
//! the `log` facade, one line per event with a fixed prefix.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { base_unit_ms } => {
                info!("START | base_unit={}ms", base_unit_ms);
            }
            AppEvent::StateChanged { task, from, to } => {
                info!("STATE | {} | {} -> {}", task, from.name(), to.name());
            }
            AppEvent::MachineReset { task, state } => {
                warn!("RESET | {} | restarted in {}", task, state.name());
            }
            AppEvent::PulsesMissed(count) => {
                warn!("TIMER | {} pulse(s) missed", count);
            }
        }
    }
}
