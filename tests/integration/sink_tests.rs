//! Sink coordination tests.
//!
//! Drives [`SinkService`] frame by frame with mock adapters and checks
//! registration, liveness, decisions and command de-duplication.

use glasshouse::app::events::{AppEvent, DropReason};
use glasshouse::config::SinkConfig;
use glasshouse::protocol::codec::encode;
use glasshouse::protocol::{
    ActuatorCommand, FaultStatus, LinkAddr, Measurements, Message, MessageKind, Role,
};
use glasshouse::sink::SinkService;
use glasshouse::sink::decision::Metric;

use crate::mock_hw::{
    ACTUATOR, MockRadio, RecordingSink, SENSOR_A, SENSOR_B, SINK, STRANGER, frame, raw_frame,
};

const WARM: Measurements = Measurements {
    temperature: 25,
    humidity: 10,
    light: 10,
    battery_mv: 900,
};

struct Harness {
    sink: SinkService,
    radio: MockRadio,
    events: RecordingSink,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(SinkConfig::default())
    }

    fn with_config(config: SinkConfig) -> Self {
        Self {
            sink: SinkService::new(&config),
            radio: MockRadio::new(SINK),
            events: RecordingSink::new(),
        }
    }

    fn register(&mut self, addr: LinkAddr, role: Role, now: u64) {
        let f = frame(addr, LinkAddr::BROADCAST, &Message::Registration { role });
        self.sink.on_frame(&f, now, &mut self.radio, &mut self.events);
    }

    fn send(&mut self, src: LinkAddr, msg: &Message, now: u64) {
        let f = frame(src, SINK, msg);
        self.sink.on_frame(&f, now, &mut self.radio, &mut self.events);
    }

    fn report(&mut self, src: LinkAddr, values: Measurements, now: u64) {
        self.send(src, &Message::SensorReport(values), now);
    }

    fn commands_to(&self, dest: LinkAddr) -> Vec<ActuatorCommand> {
        self.radio
            .decoded(dest, MessageKind::ActuatorCommand)
            .into_iter()
            .filter_map(|m| match m {
                Message::ActuatorCommand(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn acks_to(&self, dest: LinkAddr) -> usize {
        self.radio
            .decoded(dest, MessageKind::RegistrationAck)
            .len()
    }

    /// Actuator plus one sensor, both registered at t=0.
    fn joined() -> Self {
        let mut h = Self::new();
        h.register(ACTUATOR, Role::Actuator, 0);
        h.register(SENSOR_A, Role::SensorNode, 0);
        h
    }
}

// ── Registration ──────────────────────────────────────────────

#[test]
fn registrations_are_acked() {
    let h = Harness::joined();
    assert_eq!(h.acks_to(ACTUATOR), 1);
    assert_eq!(h.acks_to(SENSOR_A), 1);
    assert_eq!(h.sink.actuator().map(|a| a.address), Some(ACTUATOR));
    assert!(h.sink.registry().contains(SENSOR_A));
    assert!(h.events.contains(&AppEvent::SensorRegistered(SENSOR_A)));
    assert!(h.events.contains(&AppEvent::ActuatorRegistered(ACTUATOR)));
}

#[test]
fn repeated_registration_is_idempotent() {
    let mut h = Harness::new();
    h.register(SENSOR_A, Role::SensorNode, 0);
    h.register(SENSOR_A, Role::SensorNode, 3);

    assert_eq!(h.sink.registry().len(), 1);
    assert_eq!(h.acks_to(SENSOR_A), 2, "every registration gets an ack");
    assert_eq!(
        h.events.count(|e| matches!(e, AppEvent::SensorRegistered(_))),
        1
    );
    assert_eq!(h.sink.registry().get(SENSOR_A).map(|n| n.last_seen_secs), Some(3));
}

#[test]
fn full_registry_rejects_without_ack() {
    let config = SinkConfig {
        max_sensor_nodes: 2,
        ..SinkConfig::default()
    };
    let mut h = Harness::with_config(config);
    let third = LinkAddr::from_id(0x0030);
    h.register(SENSOR_A, Role::SensorNode, 0);
    h.register(SENSOR_B, Role::SensorNode, 0);
    h.register(third, Role::SensorNode, 0);

    assert_eq!(h.sink.registry().len(), 2);
    assert!(!h.sink.registry().contains(third));
    assert_eq!(h.acks_to(third), 0);
    assert!(h.events.contains(&AppEvent::SensorRejected(third)));

    // Re-registering a known node still works when full.
    h.register(SENSOR_A, Role::SensorNode, 1);
    assert_eq!(h.acks_to(SENSOR_A), 2);
}

#[test]
fn second_actuator_is_refused() {
    let mut h = Harness::joined();
    h.register(STRANGER, Role::Actuator, 1);

    assert_eq!(h.sink.actuator().map(|a| a.address), Some(ACTUATOR));
    assert_eq!(h.acks_to(STRANGER), 0);
    assert!(h.events.contains(&AppEvent::ActuatorConflict {
        registered: ACTUATOR,
        claimant: STRANGER,
    }));
}

// ── Malformed and foreign frames ──────────────────────────────

#[test]
fn wrong_token_is_dropped_as_intruder() {
    let mut h = Harness::new();
    let payload = encode(0xdead_beef, &Message::Registration {
        role: Role::SensorNode,
    })
    .unwrap();
    let f = raw_frame(SENSOR_A, LinkAddr::BROADCAST, &payload);
    h.sink.on_frame(&f, 0, &mut h.radio, &mut h.events);

    assert!(h.radio.sent.is_empty());
    assert!(h.sink.registry().is_empty());
    assert!(h.events.contains(&AppEvent::FrameDropped {
        src: SENSOR_A,
        reason: DropReason::Intruder,
    }));
}

#[test]
fn short_report_is_malformed() {
    let mut h = Harness::joined();
    let mut bytes = encode(glasshouse::protocol::DEFAULT_TOKEN, &Message::SensorReport(WARM))
        .unwrap()
        .to_vec();
    bytes.truncate(7);
    let f = raw_frame(SENSOR_A, SINK, &bytes);
    h.sink.on_frame(&f, 1, &mut h.radio, &mut h.events);

    assert!(h.commands_to(ACTUATOR).is_empty());
    assert_eq!(h.sink.stats().reports, 0);
    assert_eq!(
        h.events.count(|e| matches!(
            e,
            AppEvent::FrameDropped {
                reason: DropReason::Malformed(_),
                ..
            }
        )),
        1
    );
}

#[test]
fn report_from_unregistered_node_is_dropped() {
    let mut h = Harness::joined();
    h.report(SENSOR_B, WARM, 1);

    assert!(h.commands_to(ACTUATOR).is_empty());
    assert!(h.events.contains(&AppEvent::FrameDropped {
        src: SENSOR_B,
        reason: DropReason::UnknownSource,
    }));
}

// ── Decisions ─────────────────────────────────────────────────

#[test]
fn warm_report_opens_window_once() {
    let mut h = Harness::joined();
    h.report(SENSOR_A, WARM, 5);

    assert_eq!(
        h.commands_to(ACTUATOR),
        vec![ActuatorCommand {
            open_window: true,
            open_irrigation: false,
            darken: false,
        }]
    );

    h.report(SENSOR_A, WARM, 10);
    assert_eq!(h.commands_to(ACTUATOR).len(), 1, "identical decision resent");
    assert_eq!(h.sink.stats().reports, 2);
    assert_eq!(h.sink.stats().commands_sent, 1);
}

#[test]
fn readings_inside_dead_band_keep_previous_command() {
    let mut h = Harness::joined();
    h.report(SENSOR_A, WARM, 1);

    // 10 is inside [9, 11]: the window stays open.
    let mild = Measurements {
        temperature: 10,
        ..WARM
    };
    h.report(SENSOR_A, mild, 2);
    assert_eq!(h.commands_to(ACTUATOR).len(), 1);
    assert!(h.sink.last_sent().open_window);

    let cold = Measurements {
        temperature: 5,
        ..WARM
    };
    h.report(SENSOR_A, cold, 3);
    let sent = h.commands_to(ACTUATOR);
    assert_eq!(sent.len(), 2);
    assert!(!sent[1].open_window);
}

#[test]
fn command_is_held_until_an_actuator_exists() {
    let mut h = Harness::new();
    h.register(SENSOR_A, Role::SensorNode, 0);
    h.report(SENSOR_A, WARM, 1);

    assert_eq!(h.radio.sent_to(ACTUATOR).len(), 0);
    assert_eq!(h.sink.last_sent(), ActuatorCommand::default());
    assert_eq!(h.sink.stats().commands_held, 1);

    h.register(ACTUATOR, Role::Actuator, 2);
    h.report(SENSOR_A, WARM, 3);
    assert_eq!(h.commands_to(ACTUATOR).len(), 1);
    assert!(h.sink.last_sent().open_window);
}

#[test]
fn implausible_and_low_battery_readings_raise_advisories() {
    let mut h = Harness::joined();
    let odd = Measurements {
        temperature: 200,
        humidity: 10,
        light: 10,
        battery_mv: 700,
    };
    h.report(SENSOR_A, odd, 1);

    assert!(h.commands_to(ACTUATOR).is_empty());
    assert!(h.events.contains(&AppEvent::SensorFault {
        source: SENSOR_A,
        metric: Metric::Temperature,
        value: 200,
    }));
    assert!(h.events.contains(&AppEvent::LowBattery {
        source: SENSOR_A,
        battery_mv: 700,
    }));
}

// ── Actuator traffic ──────────────────────────────────────────

#[test]
fn actuator_status_and_heartbeat_are_reported() {
    let mut h = Harness::joined();
    h.send(ACTUATOR, &Message::Heartbeat, 4);
    h.send(
        ACTUATOR,
        &Message::ActuatorStatus(FaultStatus::WindowsBroken),
        6,
    );

    assert!(h.events.contains(&AppEvent::HeartbeatReceived(ACTUATOR)));
    assert!(
        h.events
            .contains(&AppEvent::ActuatorStatus(FaultStatus::WindowsBroken))
    );
    assert_eq!(h.sink.actuator().map(|a| a.last_seen_secs), Some(6));
}

// ── Liveness ──────────────────────────────────────────────────

#[test]
fn silent_sensor_evicted_only_after_timeout() {
    let mut h = Harness::joined();
    h.send(ACTUATOR, &Message::Heartbeat, 10);

    h.sink.on_liveness_tick(15, &mut h.events);
    assert!(h.sink.registry().contains(SENSOR_A), "15 s is not > 15 s");

    h.sink.on_liveness_tick(16, &mut h.events);
    assert!(!h.sink.registry().contains(SENSOR_A));
    assert!(h.events.contains(&AppEvent::SensorEvicted {
        addr: SENSOR_A,
        silent_secs: 16,
    }));
    assert_eq!(h.sink.stats().evictions, 1);
    assert!(h.sink.actuator().is_some());
}

#[test]
fn reports_keep_a_sensor_alive() {
    let mut h = Harness::joined();
    h.report(SENSOR_A, WARM, 9);
    h.sink.on_liveness_tick(20, &mut h.events);
    assert!(h.sink.registry().contains(SENSOR_A));
}

#[test]
fn lost_actuator_holds_commands() {
    let mut h = Harness::joined();
    h.send(ACTUATOR, &Message::Heartbeat, 10);

    h.sink.on_liveness_tick(25, &mut h.events);
    assert!(h.sink.actuator().is_some());

    h.sink.on_liveness_tick(26, &mut h.events);
    assert!(h.sink.actuator().is_none());
    assert!(h.events.contains(&AppEvent::ActuatorLost {
        addr: ACTUATOR,
        silent_secs: 16,
    }));

    h.register(SENSOR_A, Role::SensorNode, 26);
    h.report(SENSOR_A, WARM, 27);
    assert!(h.commands_to(ACTUATOR).is_empty());
    assert_eq!(h.sink.stats().commands_held, 1);
}

#[test]
fn frames_from_a_lost_actuator_are_unknown() {
    let mut h = Harness::joined();
    h.sink.on_liveness_tick(40, &mut h.events);
    assert!(h.sink.actuator().is_none());

    h.send(ACTUATOR, &Message::Heartbeat, 41);
    assert!(h.events.contains(&AppEvent::FrameDropped {
        src: ACTUATOR,
        reason: DropReason::UnknownSource,
    }));

    // It can come back by registering again.
    h.register(ACTUATOR, Role::Actuator, 42);
    assert_eq!(h.acks_to(ACTUATOR), 2);
}
