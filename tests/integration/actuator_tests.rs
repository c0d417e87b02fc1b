//! Actuator node tests.
//!
//! Runs [`ActuatorService`] inside a [`NodeTask`] so timers, frames and
//! local inputs all travel through the event queue the way they do on a
//! real node.

use glasshouse::actuator::{ActuatorService, ActuatorTimer};
use glasshouse::app::commands::AppCommand;
use glasshouse::app::events::{AppEvent, DropReason};
use glasshouse::app::join::LinkState;
use glasshouse::app::ports::Indicators;
use glasshouse::app::runtime::NodeTask;
use glasshouse::config::ActuatorConfig;
use glasshouse::protocol::{
    ActuatorCommand, Channel, FaultStatus, LinkAddr, Message, MessageKind, Role,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::mock_hw::{ACTUATOR, MockLeds, MockRadio, RecordingSink, SINK, STRANGER, frame};

type Actuator = NodeTask<ActuatorService<MockLeds, StdRng>>;

struct Harness {
    task: Actuator,
    radio: MockRadio,
    events: RecordingSink,
}

impl Harness {
    fn new() -> Self {
        Self {
            task: NodeTask::new(ActuatorService::new(
                &ActuatorConfig::default(),
                MockLeds::default(),
                StdRng::seed_from_u64(7),
            )),
            radio: MockRadio::new(ACTUATOR),
            events: RecordingSink::new(),
        }
    }

    /// Connect and receive the sink's ack at t=0.
    fn joined() -> Self {
        let mut h = Self::new();
        h.task.input(AppCommand::Connect);
        h.step(0);
        h.deliver(SINK, &Message::RegistrationAck);
        h.step(0);
        h
    }

    fn step(&mut self, now: u64) {
        self.task.step(now, &mut self.radio, &mut self.events);
    }

    fn deliver(&mut self, src: LinkAddr, msg: &Message) {
        self.task.deliver(frame(src, ACTUATOR, msg));
    }

    fn command(&mut self, command: ActuatorCommand, now: u64) {
        self.deliver(SINK, &Message::ActuatorCommand(command));
        self.step(now);
    }

    fn input(&mut self, command: AppCommand, now: u64) {
        self.task.input(command);
        self.step(now);
    }

    fn statuses(&self) -> Vec<FaultStatus> {
        self.radio
            .decoded(SINK, MessageKind::ActuatorStatus)
            .into_iter()
            .filter_map(|m| match m {
                Message::ActuatorStatus(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn channel_on(&self, channel: Channel) -> bool {
        self.task.node().machine().channel(channel).physically_on
    }
}

const WINDOW_ONLY: ActuatorCommand = ActuatorCommand {
    open_window: true,
    open_irrigation: false,
    darken: false,
};

// ── Joining ───────────────────────────────────────────────────

#[test]
fn connect_retries_then_gives_up() {
    let mut h = Harness::new();
    h.input(AppCommand::Connect, 0);
    for now in 1..=6 {
        h.step(now);
    }

    // First broadcast plus five retries.
    let attempts = h.radio.decoded(LinkAddr::BROADCAST, MessageKind::Registration);
    assert_eq!(attempts.len(), 6);
    assert!(
        attempts
            .iter()
            .all(|m| *m == Message::Registration { role: Role::Actuator })
    );
    assert!(h.events.contains(&AppEvent::JoinFailed));
    assert_eq!(h.task.node().link_state(), LinkState::Disconnected);
    assert!(!h.task.timers().is_armed(ActuatorTimer::JoinRetry));
}

#[test]
fn ack_joins_and_starts_heartbeats() {
    let mut h = Harness::joined();
    assert_eq!(h.task.node().link_state(), LinkState::Joined { sink: SINK });
    assert!(!h.task.timers().is_armed(ActuatorTimer::JoinRetry));

    for now in 1..=20 {
        h.step(now);
    }
    assert_eq!(h.radio.decoded(SINK, MessageKind::Heartbeat).len(), 2);
    assert_eq!(
        h.radio.decoded(LinkAddr::BROADCAST, MessageKind::Registration).len(),
        1,
        "no retry after the ack"
    );
}

#[test]
fn ack_from_wrong_token_is_ignored() {
    let mut h = Harness::new();
    h.input(AppCommand::Connect, 0);
    let bytes = glasshouse::protocol::codec::encode(42, &Message::RegistrationAck).unwrap();
    h.task.deliver(crate::mock_hw::raw_frame(SINK, ACTUATOR, &bytes));
    h.step(0);

    assert!(matches!(h.task.node().link_state(), LinkState::Joining { .. }));
    assert!(h.events.contains(&AppEvent::FrameDropped {
        src: SINK,
        reason: DropReason::Intruder,
    }));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn command_drives_channels_and_leds() {
    let mut h = Harness::joined();
    h.command(
        ActuatorCommand {
            open_window: true,
            open_irrigation: true,
            darken: false,
        },
        1,
    );

    assert!(h.channel_on(Channel::Windows));
    assert!(h.channel_on(Channel::Irrigation));
    assert!(!h.channel_on(Channel::Lights));
    assert_eq!(
        h.task.node().indicators().current(),
        Indicators {
            green: true,
            red: true,
        }
    );
    assert!(h.events.contains(&AppEvent::ChannelSwitched {
        channel: Channel::Windows,
        on: true,
    }));

    h.command(ActuatorCommand::default(), 2);
    assert_eq!(h.task.node().indicators().current(), Indicators::OFF);
}

#[test]
fn lights_alone_light_both_leds() {
    let mut h = Harness::joined();
    h.command(
        ActuatorCommand {
            darken: true,
            ..ActuatorCommand::default()
        },
        1,
    );
    assert_eq!(
        h.task.node().indicators().current(),
        Indicators {
            green: true,
            red: true,
        }
    );
}

#[test]
fn command_from_stranger_is_dropped() {
    let mut h = Harness::joined();
    h.deliver(STRANGER, &Message::ActuatorCommand(WINDOW_ONLY));
    h.step(1);

    assert!(!h.channel_on(Channel::Windows));
    assert!(h.events.contains(&AppEvent::FrameDropped {
        src: STRANGER,
        reason: DropReason::UnknownSource,
    }));
}

#[test]
fn command_before_join_is_dropped() {
    let mut h = Harness::new();
    h.deliver(SINK, &Message::ActuatorCommand(WINDOW_ONLY));
    h.step(0);
    assert!(!h.channel_on(Channel::Windows));
}

// ── Break and repair ──────────────────────────────────────────

#[test]
fn break_and_repair_are_reported_to_sink() {
    let mut h = Harness::joined();
    h.command(WINDOW_ONLY, 1);

    h.input(AppCommand::BreakRandom, 2);
    let statuses = h.statuses();
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].is_broken());
    let broken = statuses[0].channel();
    assert!(h.task.node().machine().channel(broken).broken);
    assert!(!h.channel_on(broken));

    // Ask for the broken channel to change while it is down.
    let mut wanted = WINDOW_ONLY;
    wanted.set(broken, !WINDOW_ONLY.get(broken));
    h.command(wanted, 3);
    assert!(!h.channel_on(broken));
    assert!(h.events.contains(&AppEvent::ChannelDeferred {
        channel: broken,
        pending_on: wanted.get(broken),
    }));

    h.input(AppCommand::Repair, 4);
    let statuses = h.statuses();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[1], FaultStatus::ok(broken));
    assert_eq!(h.channel_on(broken), wanted.get(broken));
    assert!(
        h.task
            .node()
            .machine()
            .channels()
            .iter()
            .all(|c| c.is_consistent())
    );
}

#[test]
fn break_ignored_while_disconnected() {
    let mut h = Harness::new();
    h.input(AppCommand::BreakRandom, 0);

    assert!(h.radio.sent.is_empty());
    assert_eq!(
        h.events
            .count(|e| matches!(e, AppEvent::ChannelBroken { .. })),
        0
    );
}

#[test]
fn every_channel_can_break_once() {
    let mut h = Harness::joined();
    for now in 1..=4 {
        h.input(AppCommand::BreakRandom, now);
    }
    assert_eq!(h.statuses().len(), Channel::COUNT);
    assert!(h.task.node().machine().all_broken());

    for now in 5..=8 {
        h.input(AppCommand::Repair, now);
    }
    let repaired: Vec<_> = h.statuses()[Channel::COUNT..].to_vec();
    assert_eq!(
        repaired,
        vec![
            FaultStatus::IrrigationOk,
            FaultStatus::WindowsOk,
            FaultStatus::LightsOk,
        ]
    );
}
