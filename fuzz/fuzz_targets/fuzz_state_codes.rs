//! Fuzz target: arbitrary state codes restored into the task list
//!
//! Each input byte pair selects a task slot and a signed state code,
//! decoded against either machine kind.  Whatever lands in a slot, the
//! controller must keep running and each task must hold a state of its
//! own kind after its next invocation.
//!
//! cargo fuzz run fuzz_state_codes

#![no_main]

use intersection::adapters::sim::{RecordingOutputs, ScriptedAnalog};
use intersection::app::events::AppEvent;
use intersection::app::ports::EventSink;
use intersection::app::service::{Controller, TASK_COUNT};
use intersection::config::{ControllerConfig, TaskPeriods};
use intersection::fsm::{Lane, MachineKind, MachineState};
use libfuzzer_sys::fuzz_target;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut config = ControllerConfig::default();
    // Every task fires on every pulse.
    config.periods = TaskPeriods {
        approach_one: 1,
        light_one: 1,
        approach_two: 1,
        light_two: 1,
    };
    let Ok(mut ctl) = Controller::new(config, ScriptedAnalog::default()) else {
        return;
    };
    let mut out = RecordingOutputs::new();
    ctl.start(&mut out, &mut Discard);

    for pair in data.chunks_exact(2) {
        let slot = usize::from(pair[0]) % TASK_COUNT;
        let kind = if pair[0] & 0x80 == 0 {
            MachineKind::Approach
        } else {
            MachineKind::Light
        };
        if let Some(state) = MachineState::from_code(kind, pair[1] as i8) {
            ctl.restore_state(slot, state);
        }
        ctl.pulse(&mut out, &mut Discard);

        for lane in Lane::ALL {
            assert!(ctl.approach_state(lane).is_some());
            assert!(ctl.light_state(lane).is_some());
        }
    }
});
