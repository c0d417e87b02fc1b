//! Glasshouse host simulation: main entry point.
//!
//! Runs a sink, one actuator and two sensor nodes on a simulated radio
//! medium and logs everything they do.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimMedium / SimRadio   LogEventSink   JsonConfigFile  SimClock│
//! │  (RadioPort)            (EventSink)    (ConfigPort)            │
//! │  RandomWalk (SamplePort)   ConsoleLeds (IndicatorPort)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌────────────────┐    │
//! │  │ SinkService  │  │ ActuatorService  │  │ SensorService  │    │
//! │  └──────────────┘  └──────────────────┘  └────────────────┘    │
//! │                                                                │
//! │  NodeTask: EventQueue · Scheduler (one per node)               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `glasshouse [CONFIG.json] [--secs N] [--loss P] [--seed S] [--realtime]`
//! (`--help` lists the defaults).

#![deny(unused_must_use)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use glasshouse::actuator::{ActuatorService, ActuatorTimer};
use glasshouse::adapters::config_file::JsonConfigFile;
use glasshouse::adapters::log_sink::LogEventSink;
use glasshouse::adapters::sim_radio::SimMedium;
use glasshouse::adapters::time::{HostClock, SimClock};
use glasshouse::app::commands::AppCommand;
use glasshouse::app::ports::{ConfigPort, IndicatorPort, Indicators, SamplePort};
use glasshouse::app::runtime::{Node, NodeTask};
use glasshouse::config::SystemConfig;
use glasshouse::protocol::{LinkAddr, Measurements};
use glasshouse::sensor::SensorService;
use glasshouse::sink::SinkService;

const SINK: LinkAddr = LinkAddr::from_id(0x0001);
const ACTUATOR: LinkAddr = LinkAddr::from_id(0x0002);
const SENSORS: [LinkAddr; 2] = [LinkAddr::from_id(0x0003), LinkAddr::from_id(0x0004)];

// ── Command line ──────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "glasshouse", version)]
#[command(about = "Greenhouse network simulation: sink, actuator and two sensors")]
struct Cli {
    /// JSON configuration file; defaults are used when omitted
    config: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 180)]
    secs: u64,

    /// Probability that a frame is lost on the air
    #[arg(long, default_value_t = 0.0, value_parser = parse_loss)]
    loss: f64,

    /// Seed for loss, breakage and sample noise
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Follow the wall clock instead of stepping one second per loop
    #[arg(long)]
    realtime: bool,
}

fn parse_loss(raw: &str) -> std::result::Result<f64, String> {
    let p: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is not a probability within 0..=1"))
    }
}

// ── Simulated hardware ────────────────────────────────────────

/// Raw samples that drift a little on every call.
struct RandomWalk {
    rng: StdRng,
    current: Measurements,
}

impl RandomWalk {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            current: Measurements {
                temperature: 18,
                humidity: 12,
                light: 12,
                battery_mv: 1000,
            },
        }
    }
}

impl SamplePort for RandomWalk {
    fn sample(&mut self) -> Measurements {
        let c = &mut self.current;
        c.temperature = (c.temperature + self.rng.gen_range(-2..=3)).clamp(0, 40);
        c.humidity = c.humidity.saturating_add_signed(self.rng.gen_range(-3..=2)).min(40);
        c.light = (c.light + self.rng.gen_range(-3..=2)).clamp(0, 30);
        c.battery_mv = (c.battery_mv - self.rng.gen_range(0..=3)).max(600);
        *c
    }
}

/// Indicator LEDs rendered as log lines.
struct ConsoleLeds {
    node: &'static str,
    last: Option<Indicators>,
}

impl ConsoleLeds {
    fn new(node: &'static str) -> Self {
        Self { node, last: None }
    }
}

impl IndicatorPort for ConsoleLeds {
    fn show(&mut self, state: Indicators) {
        if self.last != Some(state) {
            debug!(
                "[{}] LED   | green={} red={}",
                self.node,
                u8::from(state.green),
                u8::from(state.red)
            );
            self.last = Some(state);
        }
    }
}

// ── Loop plumbing ─────────────────────────────────────────────

/// Move waiting frames into the node's queue, then let it run.
fn pump<N: Node>(
    medium: &SimMedium,
    addr: LinkAddr,
    task: &mut NodeTask<N>,
    now: u64,
    log: &mut LogEventSink,
) {
    while let Some(frame) = medium.receive(addr) {
        task.deliver(frame);
    }
    task.step(now, &mut medium.radio(addr), log);
}

/// Local inputs the operator "presses" during the run.
fn script(now: u64) -> (&'static [AppCommand], &'static [AppCommand]) {
    match now {
        1 => (&[AppCommand::Connect], &[]),
        2 => (&[], &[AppCommand::Connect]),
        30 => (&[], &[AppCommand::Perturb]),
        45 => (&[AppCommand::BreakRandom], &[]),
        60 => (&[], &[AppCommand::SetReportingPeriod(5)]),
        75 => (&[AppCommand::Repair], &[]),
        120 => (&[], &[AppCommand::Disconnect]),
        150 => (&[], &[AppCommand::Connect]),
        _ => (&[], &[]),
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Glasshouse v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let opts = Cli::parse();

    // ── 1. Configuration ──────────────────────────────────────
    let config = match &opts.config {
        Some(path) => JsonConfigFile::new(path)
            .load()
            .with_context(|| format!("loading {}", path.display()))?,
        None => SystemConfig::default(),
    };
    config.validate().context("configuration")?;

    // ── 2. Medium and nodes ───────────────────────────────────
    let mut medium = if opts.loss > 0.0 {
        SimMedium::with_loss(opts.loss, opts.seed)
    } else {
        SimMedium::new()
    };
    for addr in [SINK, ACTUATOR].into_iter().chain(SENSORS) {
        medium.attach(addr);
    }

    let mut sink = NodeTask::new(SinkService::new(&config.sink));
    let mut actuator = NodeTask::new(ActuatorService::new(
        &config.actuator,
        ConsoleLeds::new("actuator"),
        StdRng::seed_from_u64(opts.seed),
    ));
    let mut sensors: Vec<_> = (1..=SENSORS.len() as u64)
        .map(|i| {
            NodeTask::new(SensorService::new(
                &config.sensor,
                ConsoleLeds::new("sensor"),
                RandomWalk::new(opts.seed.wrapping_add(i)),
            ))
        })
        .collect();

    let mut sink_log = LogEventSink::new("sink");
    let mut actuator_log = LogEventSink::new("actuator");
    let mut sensor_logs = [LogEventSink::new("sensor-3"), LogEventSink::new("sensor-4")];

    // ── 3. Run ────────────────────────────────────────────────
    let mut sim_clock = SimClock::new();
    let host_clock = HostClock::new();
    let mut last_tick = None;

    loop {
        let now = if opts.realtime {
            host_clock.uptime_secs()
        } else {
            sim_clock.uptime_secs()
        };
        if now > opts.secs {
            break;
        }

        if last_tick != Some(now) {
            last_tick = Some(now);
            let (to_actuator, to_sensors) = script(now);
            for &cmd in to_actuator {
                actuator.input(cmd);
            }
            for task in &mut sensors {
                for &cmd in to_sensors {
                    task.input(cmd);
                }
            }
        }

        pump(&medium, SINK, &mut sink, now, &mut sink_log);
        pump(&medium, ACTUATOR, &mut actuator, now, &mut actuator_log);
        for ((addr, task), log) in SENSORS.iter().zip(&mut sensors).zip(&mut sensor_logs) {
            pump(&medium, *addr, task, now, log);
        }

        if opts.realtime {
            std::thread::sleep(Duration::from_millis(250));
        } else {
            sim_clock.advance(1);
        }
    }

    // ── 4. Summary ────────────────────────────────────────────
    let stats = sink.node().stats();
    let air = medium.stats();
    info!(
        "Done: {} frames in, {} dropped, {} reports, {} commands sent, {} held, {} evictions",
        stats.frames_in,
        stats.dropped,
        stats.reports,
        stats.commands_sent,
        stats.commands_held,
        stats.evictions
    );
    info!(
        "Air: {} delivered, {} lost, {} overflowed, {} unroutable",
        air.delivered, air.lost, air.overflowed, air.unroutable
    );
    info!(
        "Actuator: link {:?}, heartbeat armed: {}",
        actuator.node().link_state(),
        actuator.timers().is_armed(ActuatorTimer::Heartbeat)
    );
    Ok(())
}
