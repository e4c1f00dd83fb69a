//! Fuzz target: controller driven by an arbitrary sensor stream
//!
//! Every four input bytes become one pulse: a big-endian reading for each
//! lane.  The lamp registers must stay well formed whatever the sensors
//! report.
//!
//! cargo fuzz run fuzz_sensor_stream

#![no_main]

use intersection::adapters::sim::{RecordingOutputs, ScriptedAnalog};
use intersection::app::events::AppEvent;
use intersection::app::ports::EventSink;
use intersection::app::service::Controller;
use intersection::config::ControllerConfig;
use intersection::fsm::Lane;
use libfuzzer_sys::fuzz_target;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = ControllerConfig::default();
    let one = config.lanes[0].channel;
    let two = config.lanes[1].channel;

    let mut adc = ScriptedAnalog::default();
    let pulses = data.len() / 4;
    for chunk in data.chunks_exact(4) {
        adc.push(one, [u16::from_be_bytes([chunk[0], chunk[1]])]);
        adc.push(two, [u16::from_be_bytes([chunk[2], chunk[3]])]);
    }

    let Ok(mut ctl) = Controller::new(config, adc) else {
        return;
    };
    let mut out = RecordingOutputs::new();
    ctl.start(&mut out, &mut Discard);

    for _ in 0..pulses {
        ctl.pulse(&mut out, &mut Discard);
        for lane in Lane::ALL {
            assert!(ctl.outputs().position(lane).bits().count_ones() <= 1);
            assert!(ctl.outputs().phase(lane).is_some());
        }
    }
});
