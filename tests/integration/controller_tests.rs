//! Integration tests for Controller wiring: period reduction, events,
//! timer pulses and machine resets.

use intersection::app::events::AppEvent;
use intersection::app::service::{Controller, TASK_LABELS, task_index};
use intersection::config::ControllerConfig;
use intersection::error::{ConfigError, Error};
use intersection::fsm::{ApproachState, Lane, LightState, MachineKind, MachineState};

use super::mock_hw::{EventLog, MockAnalog, MockOutputs, Rig, ScriptedTimer};

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_announces_base_unit() {
    let rig = Rig::new();
    assert_eq!(rig.log.events, [AppEvent::Started { base_unit_ms: 50 }]);
    assert_eq!(rig.out.flushes.len(), 1);
    assert_eq!(rig.out.last().signal_bits(), 0);
}

#[test]
fn custom_periods_are_reduced() {
    let json = r#"{
        "periods": { "approach_one": 30, "light_one": 90, "approach_two": 45, "light_two": 90 },
        "lanes": [
            { "channel": 0, "min_reading": 48, "margin": 5 },
            { "channel": 6, "min_reading": 48, "margin": 5 }
        ],
        "dwell": {
            "pass_indicator_ticks": 10,
            "hold_at_line_ticks": 10,
            "grant_debounce_ticks": 2,
            "green_ticks": 4,
            "yellow_ticks": 4
        }
    }"#;
    let config = ControllerConfig::from_json(json).unwrap();
    let rig = Rig::with_config(config);
    assert_eq!(rig.ctl.base_unit(), 15);
    assert_eq!(rig.ctl.task_ticks(), &[2, 6, 3, 6]);
}

#[test]
fn invalid_config_fails_startup() {
    let mut config = ControllerConfig::default();
    config.lanes[1].channel = config.lanes[0].channel;
    let err = Controller::new(config, MockAnalog::new()).err();
    assert!(matches!(
        err,
        Some(Error::Config(ConfigError::ValidationFailed(_)))
    ));
}

// ── Events ────────────────────────────────────────────────────

#[test]
fn first_pulse_reports_every_init_exit() {
    let mut rig = Rig::new();
    rig.pulse();
    for (i, &label) in TASK_LABELS.iter().enumerate() {
        let from = MachineState::from_code(
            if i % 2 == 0 { MachineKind::Approach } else { MachineKind::Light },
            0,
        )
        .unwrap();
        let expected = AppEvent::StateChanged {
            task: label,
            from,
            to: rig.ctl.state(i).unwrap(),
        };
        assert!(rig.log.events.contains(&expected), "missing {:?}", expected);
    }
}

#[test]
fn quiet_pulses_emit_nothing() {
    let mut rig = Rig::new();
    rig.pulse();
    let after_first = rig.log.events.len();
    rig.pulses(100);
    assert_eq!(rig.log.events.len(), after_first);
    assert_eq!(rig.out.flushes.len(), 102);
}

#[test]
fn light_transitions_are_reported_on_their_own_ticks() {
    let mut rig = Rig::new();
    rig.sensor(Lane::One, 0x20);
    rig.pulses(2);
    rig.sensor(Lane::One, 0x50);
    rig.pulses(400);

    let light_changes: Vec<_> = rig
        .log
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { task: "light-1", to: MachineState::Light(s), .. } => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        light_changes,
        [
            LightState::Idle,
            LightState::Grant,
            LightState::Hold,
            LightState::ExtendedHold,
            LightState::YieldPhase,
            LightState::Idle
        ]
    );
}

// ── Resets ────────────────────────────────────────────────────

#[test]
fn wrong_kind_state_is_reset_and_reported() {
    let mut rig = Rig::new();
    rig.pulses(3);
    let slot = task_index(MachineKind::Light, Lane::Two);
    rig.ctl
        .restore_state(slot, MachineState::Approach(ApproachState::Advancing));

    // Light 2 only fires every tenth pulse.
    rig.pulses(10);
    let resets = rig.log.count(|e| matches!(e, AppEvent::MachineReset { .. }));
    assert_eq!(resets, 1);
    assert!(rig.log.events.contains(&AppEvent::MachineReset {
        task: "light-2",
        state: MachineState::Light(LightState::Init),
    }));

    rig.pulses(10);
    assert_eq!(rig.ctl.light_state(Lane::Two), Some(LightState::Idle));
    assert_eq!(rig.out.last().signal_bits(), 0x24);
}

#[test]
fn reset_light_does_not_repaint_other_lane() {
    let mut rig = Rig::new();
    rig.sensor(Lane::One, 0x20);
    rig.pulses(2);
    rig.sensor(Lane::One, 0x50);
    // Lane 1 shows green from the grant tick onward.
    rig.pulse_until(200, |r| r.ctl.light_state(Lane::One) == Some(LightState::Grant))
        .expect("lane 1 granted");

    let slot = task_index(MachineKind::Light, Lane::Two);
    rig.ctl.restore_state(slot, MachineState::Approach(ApproachState::Idle));
    rig.pulses(20);
    assert_eq!(
        rig.out.last().phase(Lane::One),
        Some(intersection::outputs::Phase::Green)
    );
}

#[test]
fn restored_advancing_without_position_recovers() {
    let mut rig = Rig::new();
    rig.pulses(3);
    let slot = task_index(MachineKind::Approach, Lane::One);
    rig.ctl
        .restore_state(slot, MachineState::Approach(ApproachState::Advancing));

    rig.pulses(2);
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Idle));
    assert!(rig.out.last().position(Lane::One).is_clear());
}

// ── Timer ─────────────────────────────────────────────────────

#[test]
fn run_for_consumes_pulses_and_reports_missed() {
    let mut ctl = Controller::new(ControllerConfig::default(), MockAnalog::new()).unwrap();
    let mut out = MockOutputs::default();
    let mut log = EventLog::default();
    let mut timer = ScriptedTimer {
        missed: vec![0, 3, 0, 1],
        waits: 0,
    };

    ctl.start(&mut out, &mut log);
    ctl.run_for(5, &mut timer, &mut out, &mut log);

    assert_eq!(timer.waits, 5);
    assert_eq!(ctl.pulse_count(), 5);
    let missed: Vec<u32> = log
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PulsesMissed(n) => Some(*n),
            _ => None,
        })
        .collect();
    assert_eq!(missed, [3, 1]);
}

#[test]
fn missed_pulses_do_not_replay_ticks() {
    let mut ctl = Controller::new(ControllerConfig::default(), MockAnalog::new()).unwrap();
    let mut out = MockOutputs::default();
    let mut log = EventLog::default();
    let mut timer = ScriptedTimer {
        missed: vec![0, 50],
        waits: 0,
    };
    ctl.start(&mut out, &mut log);
    ctl.run_for(2, &mut timer, &mut out, &mut log);
    // One flush per handled pulse plus the start-up flush.
    assert_eq!(out.flushes.len(), 3);
    assert_eq!(ctl.pulse_count(), 2);
}
