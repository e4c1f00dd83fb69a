//! Intersection controller: host simulation entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                      │
//! │                                                              │
//! │  ScriptedAnalog    RecordingOutputs   LogEventSink  SimTimer │
//! │  (AnalogPort)      (OutputPort)       (EventSink)  (Ticks)   │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            Controller (pure logic)                     │  │
//! │  │  Period reducer · Scheduler · Approach/Light FSMs      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `intersection-sim [--fast] [--pulses N] [CONFIG.json]`

use anyhow::{Context, Result, bail};
use log::info;

use intersection::adapters::console;
use intersection::adapters::log_sink::LogEventSink;
use intersection::adapters::sim::{DAYLIGHT, RecordingOutputs, ScriptedAnalog};
use intersection::app::ports::TickSource;
use intersection::app::service::Controller;
use intersection::config::ControllerConfig;
use intersection::drivers::tick_timer::SimTimer;
use intersection::fsm::Lane;

/// Reading of a photoresistor shadowed by a car.
const CAR: u16 = 0x20;

const DEFAULT_PULSES: u64 = 400;

// ── Command line ──────────────────────────────────────────────

struct Options {
    config_path: Option<String>,
    pulses: u64,
    fast: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options> {
    let mut opts = Options {
        config_path: None,
        pulses: DEFAULT_PULSES,
        fast: false,
    };
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fast" => opts.fast = true,
            "--pulses" => {
                let value = args.next().context("--pulses needs a value")?;
                opts.pulses = value
                    .parse()
                    .with_context(|| format!("invalid pulse count '{value}'"))?;
            }
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
            path => opts.config_path = Some(path.to_owned()),
        }
    }
    Ok(opts)
}

fn load_config(path: Option<&str>) -> Result<ControllerConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(ControllerConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config = ControllerConfig::from_json(&text)
        .map_err(intersection::error::Error::from)
        .with_context(|| format!("loading {path}"))?;
    info!("Loaded config from {}", path);
    Ok(config)
}

// ── Scenario ──────────────────────────────────────────────────

/// One car on each approach, lane 2 arriving while lane 1 is served.
fn scenario(config: &ControllerConfig) -> ScriptedAnalog {
    let one = config.lanes[Lane::One.index()].channel;
    let two = config.lanes[Lane::Two.index()].channel;

    let mut adc = ScriptedAnalog::new(DAYLIGHT);
    adc.push_repeat(one, DAYLIGHT, 20);
    adc.push_repeat(one, CAR, 40);
    adc.push_repeat(one, DAYLIGHT, 1);

    adc.push_repeat(two, DAYLIGHT, 60);
    adc.push_repeat(two, CAR, 30);
    adc.push_repeat(two, DAYLIGHT, 1);
    adc
}

/// Pulse source that never waits.
struct FreeRunning;

impl TickSource for FreeRunning {
    fn wait_for_pulse(&mut self) -> u32 {
        0
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let level = console::init()?;
    info!("Intersection controller v{} (log level {})", env!("CARGO_PKG_VERSION"), level);

    let opts = parse_args(std::env::args().skip(1))?;
    let config = load_config(opts.config_path.as_deref())?;
    let adc = scenario(&config);

    let mut controller = Controller::new(config, adc)?;
    let mut out = RecordingOutputs::new();
    let mut sink = LogEventSink::new();
    controller.start(&mut out, &mut sink);

    if opts.fast {
        controller.run_for(opts.pulses, &mut FreeRunning, &mut out, &mut sink);
    } else {
        let mut timer = SimTimer::new(controller.base_unit());
        controller.run_for(opts.pulses, &mut timer, &mut out, &mut sink);
    }

    info!(
        "Ran {} pulses ({} ms each), {} distinct output frames",
        controller.pulse_count(),
        controller.base_unit(),
        out.frames().len()
    );
    for lane in Lane::ALL {
        info!(
            "Lane {}: phases {:?}, approach {:?}, light {:?}",
            lane,
            out.phase_sequence(lane),
            controller.approach_state(lane),
            controller.light_state(lane)
        );
    }
    Ok(())
}
