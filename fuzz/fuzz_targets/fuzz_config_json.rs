//! Fuzz target: `ControllerConfig::from_json`
//!
//! Arbitrary documents must either be rejected with a typed error or
//! yield a configuration the controller accepts.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use intersection::adapters::sim::ScriptedAnalog;
use intersection::app::service::Controller;
use intersection::config::ControllerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = ControllerConfig::from_json(text) {
        assert!(Controller::new(config, ScriptedAnalog::default()).is_ok());
    }
});
