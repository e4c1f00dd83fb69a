//! End-to-end lane scenarios: sensor readings in, lamp registers out.
//!
//! With the default configuration the approach machines run on every
//! pulse and the light machines on every tenth pulse, lane 1's tasks
//! firing before lane 2's within a pulse.

use intersection::fsm::{ApproachState, Lane, LightState};
use intersection::outputs::Phase;

use super::mock_hw::{CAR, NO_CAR, Rig};

const LIGHT_PERIOD: usize = 10;

/// Drive `lane` from Idle to WaitingForGrant with a car present for the
/// first sample only.
fn bring_car_to_line(rig: &mut Rig, lane: Lane) {
    rig.sensor(lane, CAR);
    rig.pulse_until(100, |r| r.ctl.approach_state(lane) == Some(ApproachState::Sensed))
        .expect("car sensed");
    rig.sensor(lane, NO_CAR);
    rig.pulse_until(100, |r| {
        r.ctl.approach_state(lane) == Some(ApproachState::WaitingForGrant)
    })
    .expect("car reaches line");
}

// ── Approach sequence ─────────────────────────────────────────

#[test]
fn car_walks_to_line_and_waits_for_grant() {
    let mut rig = Rig::new();
    rig.pulse();
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Idle));

    // 0x50 keeps the lane idle.
    rig.pulses(5);
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Idle));

    // 0x20 is below 0x30 + 0x05: sensed on the next invocation.
    rig.sensor(Lane::One, CAR);
    rig.pulse();
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Sensed));
    assert_eq!(rig.out.last().position(Lane::One).bits(), 0x01);

    for _ in 0..7 {
        rig.pulse();
        assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Advancing));
        assert_eq!(rig.out.last().position(Lane::One).bits().count_ones(), 1);
    }
    assert_eq!(rig.out.last().position(Lane::One).bits(), 0x80);

    rig.pulse();
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::HoldingAtLine));

    let mut holding = 1;
    while rig.ctl.approach_state(Lane::One) == Some(ApproachState::HoldingAtLine) {
        rig.pulse();
        holding += 1;
    }
    assert!(holding >= 10, "held {} ticks", holding);
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::WaitingForGrant));

    // Waits until the light grants passage.
    while !rig.ctl.handshake(Lane::One).go_granted() {
        assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::WaitingForGrant));
        assert!(rig.ctl.handshake(Lane::One).approach_ready());
        rig.pulse();
    }
}

#[test]
fn reading_at_threshold_never_leaves_idle() {
    let mut rig = Rig::new();
    rig.sensor(Lane::One, 0x35);
    rig.pulses(500);
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Idle));
    assert!(rig.out.last().position(Lane::One).is_clear());
}

// ── Light idle ────────────────────────────────────────────────

#[test]
fn idle_light_stays_red_for_a_thousand_ticks() {
    let mut rig = Rig::new();
    rig.pulses(1000 * LIGHT_PERIOD);

    assert_eq!(rig.ctl.light_state(Lane::One), Some(LightState::Idle));
    assert_eq!(rig.ctl.light_state(Lane::Two), Some(LightState::Idle));
    // The first flush is the dark start-up image.
    for frame in &rig.out.flushes[1..] {
        assert_eq!(frame.phase(Lane::One), Some(Phase::Red));
        assert_eq!(frame.phase(Lane::Two), Some(Phase::Red));
    }
    assert!(!rig.ctl.handshake(Lane::One).go_granted());
}

// ── Full cycle ────────────────────────────────────────────────

#[test]
fn one_vehicle_yields_one_green_yellow_red_cycle() {
    let mut rig = Rig::new();
    bring_car_to_line(&mut rig, Lane::One);
    rig.pulses(40 * LIGHT_PERIOD);

    assert_eq!(
        rig.out.phase_changes(Lane::One),
        [Phase::Red, Phase::Green, Phase::Yellow, Phase::Red]
    );
    assert_eq!(rig.out.phase_changes(Lane::Two), [Phase::Red]);
    assert_eq!(rig.ctl.light_state(Lane::One), Some(LightState::Idle));
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Idle));
    assert!(!rig.ctl.handshake(Lane::One).go_granted());
    assert!(!rig.ctl.handshake(Lane::One).approach_ready());
}

#[test]
fn green_lasts_dwell_plus_constant_overhead() {
    let mut rig = Rig::new();
    bring_car_to_line(&mut rig, Lane::One);
    rig.pulses(40 * LIGHT_PERIOD);

    let green_flushes = rig
        .out
        .phases(Lane::One)
        .into_iter()
        .filter(|p| *p == Some(Phase::Green))
        .count();
    let green_ticks = green_flushes.div_ceil(LIGHT_PERIOD);
    let configured = rig.ctl.config().dwell.green_ticks as usize;
    // Grant, Hold and the ExtendedHold entry tick.
    assert!(green_ticks <= configured + 3, "green for {} light ticks", green_ticks);
    assert!(green_ticks > configured);

    let yellow_flushes = rig
        .out
        .phases(Lane::One)
        .into_iter()
        .filter(|p| *p == Some(Phase::Yellow))
        .count();
    let yellow = rig.ctl.config().dwell.yellow_ticks as usize;
    assert_eq!(yellow_flushes, yellow * LIGHT_PERIOD);
}

#[test]
fn two_vehicles_give_two_cycles() {
    let mut rig = Rig::new();
    for _ in 0..2 {
        bring_car_to_line(&mut rig, Lane::One);
        rig.pulses(40 * LIGHT_PERIOD);
    }
    assert_eq!(
        rig.out.phase_changes(Lane::One),
        [
            Phase::Red,
            Phase::Green,
            Phase::Yellow,
            Phase::Red,
            Phase::Green,
            Phase::Yellow,
            Phase::Red
        ]
    );
}

// ── Handshake liveness ────────────────────────────────────────

#[test]
fn held_request_is_granted_within_debounce_bound() {
    let mut rig = Rig::new();
    bring_car_to_line(&mut rig, Lane::One);
    assert!(rig.ctl.handshake(Lane::One).approach_ready());

    let pulses = rig
        .pulse_until(100 * LIGHT_PERIOD, |r| r.ctl.handshake(Lane::One).go_granted())
        .expect("granted");
    assert_eq!(rig.ctl.light_state(Lane::One), Some(LightState::Hold));

    let debounce = rig.ctl.config().dwell.grant_debounce_ticks as usize;
    // Debounce, Grant, Hold; the request may land just after a light tick.
    assert!(pulses <= (debounce + 3) * LIGHT_PERIOD, "granted after {} pulses", pulses);

    // The approach withdraws on its very next invocation.
    rig.pulse();
    assert!(!rig.ctl.handshake(Lane::One).approach_ready());
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Idle));
    assert!(rig.out.last().pass(Lane::One));
    assert!(rig.out.last().position(Lane::One).is_clear());
}

#[test]
fn pass_lamp_goes_dark_after_clearance() {
    let mut rig = Rig::new();
    bring_car_to_line(&mut rig, Lane::One);
    rig.pulse_until(100 * LIGHT_PERIOD, |r| r.out.last().pass(Lane::One))
        .expect("pass lamp lit");
    rig.pulses(40 * LIGHT_PERIOD);
    assert!(!rig.out.last().pass(Lane::One));
}

// ── Lane independence ─────────────────────────────────────────

#[test]
fn lanes_run_independently() {
    let mut rig = Rig::new();
    bring_car_to_line(&mut rig, Lane::Two);
    rig.pulses(40 * LIGHT_PERIOD);

    assert_eq!(rig.out.phase_changes(Lane::One), [Phase::Red]);
    assert_eq!(
        rig.out.phase_changes(Lane::Two),
        [Phase::Red, Phase::Green, Phase::Yellow, Phase::Red]
    );
    for frame in &rig.out.flushes {
        assert!(frame.position(Lane::One).is_clear());
        assert!(!frame.pass(Lane::One));
    }
}

#[test]
fn both_lanes_may_show_green_together() {
    let mut rig = Rig::new();
    rig.sensor(Lane::One, CAR);
    rig.sensor(Lane::Two, CAR);
    rig.pulses(3);
    rig.sensor(Lane::One, NO_CAR);
    rig.sensor(Lane::Two, NO_CAR);
    rig.pulses(40 * LIGHT_PERIOD);

    let overlap = rig.out.flushes.iter().any(|f| {
        f.phase(Lane::One) == Some(Phase::Green) && f.phase(Lane::Two) == Some(Phase::Green)
    });
    assert!(overlap);
}

#[test]
fn failing_sensor_keeps_lane_idle() {
    let mut rig = Rig::new();
    let channel = rig.ctl.config().lanes[0].channel as usize;
    rig.ctl.adc_mut().failing[channel] = true;
    rig.ctl.adc_mut().levels[channel] = CAR;
    rig.pulses(100);
    assert_eq!(rig.ctl.approach_state(Lane::One), Some(ApproachState::Idle));
    assert_eq!(rig.ctl.context().approach[0].last_reading, u16::MAX);
}
