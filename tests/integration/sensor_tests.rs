//! Sensor node tests: joining, periodic reports, runtime period changes
//! and status LEDs.

use glasshouse::app::commands::AppCommand;
use glasshouse::app::events::{AppEvent, DropReason, PeriodKind};
use glasshouse::app::join::LinkState;
use glasshouse::app::ports::Indicators;
use glasshouse::app::runtime::NodeTask;
use glasshouse::config::SensorConfig;
use glasshouse::protocol::{LinkAddr, Measurements, Message, MessageKind};
use glasshouse::sensor::{SensorService, SensorTimer};

use crate::mock_hw::{FixedSamples, MockLeds, MockRadio, RecordingSink, SENSOR_A, SINK, frame};

const READING: Measurements = Measurements {
    temperature: 21,
    humidity: 14,
    light: 9,
    battery_mv: 950,
};

const RED: Indicators = Indicators {
    green: false,
    red: true,
};
const GREEN: Indicators = Indicators {
    green: true,
    red: false,
};

struct Harness {
    task: NodeTask<SensorService<MockLeds, FixedSamples>>,
    radio: MockRadio,
    events: RecordingSink,
}

impl Harness {
    fn new() -> Self {
        Self {
            task: NodeTask::new(SensorService::new(
                &SensorConfig::default(),
                MockLeds::default(),
                FixedSamples(READING),
            )),
            radio: MockRadio::new(SENSOR_A),
            events: RecordingSink::new(),
        }
    }

    fn joined() -> Self {
        let mut h = Self::new();
        h.input(AppCommand::Connect, 0);
        h.task
            .deliver(frame(SINK, SENSOR_A, &Message::RegistrationAck));
        h.step(0);
        h
    }

    fn step(&mut self, now: u64) {
        self.task.step(now, &mut self.radio, &mut self.events);
    }

    fn run(&mut self, from: u64, to: u64) {
        for now in from..=to {
            self.step(now);
        }
    }

    fn input(&mut self, command: AppCommand, now: u64) {
        self.task.input(command);
        self.step(now);
    }

    fn reports(&self) -> Vec<Message> {
        self.radio.decoded(SINK, MessageKind::SensorReport)
    }
}

#[test]
fn joins_then_reports_means() {
    let mut h = Harness::joined();
    assert_eq!(h.task.node().link_state(), LinkState::Joined { sink: SINK });
    assert_eq!(
        h.radio.decoded(LinkAddr::BROADCAST, MessageKind::Registration).len(),
        1
    );

    h.run(1, 9);
    assert_eq!(h.task.node().sampler().samples(), 4);
    assert_eq!(h.reports(), vec![Message::SensorReport(READING)]);

    h.run(10, 18);
    assert_eq!(h.reports().len(), 2);
}

#[test]
fn leds_follow_link_state() {
    let mut h = Harness::new();
    h.step(0);
    assert_eq!(h.task.node().indicators().current(), RED);

    h.input(AppCommand::Connect, 0);
    assert_eq!(h.task.node().indicators().current(), GREEN);

    h.task
        .deliver(frame(SINK, SENSOR_A, &Message::RegistrationAck));
    h.step(0);
    assert_eq!(h.task.node().indicators().current(), Indicators::OFF);

    h.input(AppCommand::Disconnect, 1);
    assert_eq!(h.task.node().indicators().current(), RED);
}

#[test]
fn unanswered_join_falls_back_to_disconnected() {
    let mut h = Harness::new();
    h.input(AppCommand::Connect, 0);
    h.run(1, 5);
    assert!(matches!(
        h.task.node().link_state(),
        LinkState::Joining { attempts: 6 }
    ));

    h.run(6, 6);
    assert_eq!(h.task.node().link_state(), LinkState::Disconnected);
    assert_eq!(
        h.radio
            .decoded(LinkAddr::BROADCAST, MessageKind::Registration)
            .len(),
        6
    );
    assert!(h.events.contains(&AppEvent::JoinFailed));
    assert_eq!(h.task.node().indicators().current(), RED);
    assert!(h.reports().is_empty());
}

#[test]
fn disconnect_stops_all_timers() {
    let mut h = Harness::joined();
    h.input(AppCommand::Disconnect, 1);

    assert_eq!(h.task.timers().active_count(), 0);
    assert!(h.events.contains(&AppEvent::Disconnected));
    h.run(2, 30);
    assert!(h.reports().is_empty());
}

#[test]
fn out_of_range_periods_are_ignored() {
    let mut h = Harness::joined();
    h.input(AppCommand::SetReportingPeriod(0), 1);
    h.input(AppCommand::SetSamplingPeriod(10), 1);

    assert_eq!(h.task.node().periods(), (2, 9));
    assert_eq!(
        h.events
            .count(|e| matches!(e, AppEvent::PeriodChanged { .. })),
        0
    );
}

#[test]
fn new_reporting_period_restarts_timer() {
    let mut h = Harness::joined();
    h.input(AppCommand::SetReportingPeriod(5), 3);

    assert_eq!(h.task.node().periods(), (2, 5));
    assert!(h.events.contains(&AppEvent::PeriodChanged {
        kind: PeriodKind::Reporting,
        secs: 5,
    }));
    assert_eq!(h.task.timers().deadline(SensorTimer::Report), Some(8));

    h.run(4, 13);
    assert_eq!(h.reports().len(), 2);
}

#[test]
fn period_set_while_disconnected_applies_after_join() {
    let mut h = Harness::new();
    h.input(AppCommand::SetSamplingPeriod(3), 0);
    assert!(!h.task.timers().is_armed(SensorTimer::Sample));

    h.input(AppCommand::Connect, 1);
    h.task
        .deliver(frame(SINK, SENSOR_A, &Message::RegistrationAck));
    h.step(1);
    assert_eq!(h.task.timers().deadline(SensorTimer::Sample), Some(4));
}

#[test]
fn perturb_shifts_the_next_report() {
    let mut h = Harness::joined();
    h.run(1, 8);
    h.input(AppCommand::Perturb, 8);
    h.step(9);

    assert_eq!(
        h.reports(),
        vec![Message::SensorReport(Measurements {
            temperature: READING.temperature + 10,
            ..READING
        })]
    );
    assert_eq!(h.task.node().sampler().samples(), 4);
}

#[test]
fn perturb_cycles_and_lowers_battery() {
    let mut h = Harness::joined();
    h.run(1, 8);
    for _ in 0..4 {
        h.input(AppCommand::Perturb, 8);
    }
    h.step(9);

    assert_eq!(
        h.reports(),
        vec![Message::SensorReport(Measurements {
            temperature: READING.temperature + 10,
            humidity: READING.humidity + 10,
            light: READING.light + 10,
            battery_mv: READING.battery_mv - 10,
        })]
    );
}

#[test]
fn perturb_ignored_while_disconnected() {
    let mut h = Harness::new();
    h.input(AppCommand::Perturb, 0);
    assert_eq!(h.task.node().sampler().means(), Measurements::default());

    h.input(AppCommand::Connect, 1);
    h.task
        .deliver(frame(SINK, SENSOR_A, &Message::RegistrationAck));
    h.step(1);
    h.run(2, 10);
    assert_eq!(h.reports(), vec![Message::SensorReport(READING)]);
}

#[test]
fn unsolicited_ack_is_unexpected() {
    let mut h = Harness::new();
    h.task
        .deliver(frame(SINK, SENSOR_A, &Message::RegistrationAck));
    h.step(0);

    assert_eq!(h.task.node().link_state(), LinkState::Disconnected);
    assert!(h.events.contains(&AppEvent::FrameDropped {
        src: SINK,
        reason: DropReason::Unexpected,
    }));
}
