//! Sink coordinator service.
//!
//! [`SinkService`] owns the node registry, the actuator link, the decision
//! engine and the last-sent command. Every inbound frame is routed by
//! destination and source address, never by looking at its contents:
//!
//! ```text
//! frame ─▶ token ok? ─no──▶ drop (intruder)
//!             │
//!             ├─ broadcast ─────────────▶ Registration ─▶ registry / actuator link
//!             ├─ unicast from actuator ─▶ Heartbeat | ActuatorStatus
//!             ├─ unicast from sensor ───▶ SensorReport ─▶ decide ─▶ diff ─▶ send
//!             └─ anyone else ───────────▶ drop (unknown source)
//! ```

use log::{debug, info, warn};

use crate::app::events::{AppEvent, DropReason, NodeRole};
use crate::app::ports::{EventSink, RadioPort};
use crate::app::runtime::{Node, NodeCtx};
use crate::config::SinkConfig;
use crate::error::RegistryError;
use crate::events::{Event, Inbound};
use crate::protocol::codec::{check_token, decode};
use crate::protocol::message::Measurements;
use crate::protocol::{
    ActuatorCommand, LinkAddr, Message, MessageKind, Role, SensorReading, Token,
};
use crate::scheduler::TimerKind;

use super::decision::{Advisory, DecisionEngine};
use super::differ::{CommandDiffer, DiffOutcome};
use super::liveness::LivenessMonitor;
use super::registry::{ActuatorLink, AddOutcome, NodeRegistry};

/// The sink's only timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkTimer {
    Liveness,
}

/// Running counters, for the console and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub frames_in: u32,
    pub dropped: u32,
    pub reports: u32,
    pub commands_sent: u32,
    pub commands_held: u32,
    pub evictions: u32,
}

/// The coordinator.
pub struct SinkService {
    token: Token,
    registry: NodeRegistry,
    actuator: Option<ActuatorLink>,
    liveness: LivenessMonitor,
    liveness_period_secs: u64,
    engine: DecisionEngine,
    differ: CommandDiffer,
    stats: SinkStats,
}

impl SinkService {
    pub fn new(config: &SinkConfig) -> Self {
        Self {
            token: config.token,
            registry: NodeRegistry::new(config.max_sensor_nodes),
            actuator: None,
            liveness: LivenessMonitor::new(
                config.sensor_timeout_secs,
                config.actuator_timeout_secs,
            ),
            liveness_period_secs: config.liveness_period_secs,
            engine: DecisionEngine::new(config),
            differ: CommandDiffer::new(),
            stats: SinkStats::default(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn actuator(&self) -> Option<ActuatorLink> {
        self.actuator
    }

    pub fn last_sent(&self) -> ActuatorCommand {
        self.differ.last_sent()
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    // ── Inbound frames ────────────────────────────────────────

    /// Route one inbound frame.
    pub fn on_frame(
        &mut self,
        frame: &Inbound,
        now: u64,
        radio: &mut dyn RadioPort,
        events: &mut dyn EventSink,
    ) {
        self.stats.frames_in = self.stats.frames_in.wrapping_add(1);
        let src = frame.src;
        let payload = frame.payload.as_slice();

        let smallest = if frame.is_broadcast() {
            MessageKind::Registration
        } else {
            MessageKind::Heartbeat
        };
        if let Err(e) = check_token(self.token, smallest, payload) {
            self.drop_frame(src, e.into(), events);
            return;
        }

        if frame.is_broadcast() {
            match decode(MessageKind::Registration, self.token, payload) {
                Ok(Message::Registration { role }) => {
                    self.on_registration(src, role, now, radio, events);
                }
                Ok(_) => self.drop_frame(src, DropReason::Unexpected, events),
                Err(e) => self.drop_frame(src, e.into(), events),
            }
            return;
        }

        if self.actuator.is_some_and(|a| a.address == src) {
            self.on_actuator_frame(src, payload, now, events);
        } else if self.registry.contains(src) {
            match decode(MessageKind::SensorReport, self.token, payload) {
                Ok(Message::SensorReport(values)) => {
                    self.registry.touch(src, now);
                    self.on_report(src, values, radio, events);
                }
                Ok(_) => self.drop_frame(src, DropReason::Unexpected, events),
                Err(e) => self.drop_frame(src, e.into(), events),
            }
        } else {
            self.drop_frame(src, DropReason::UnknownSource, events);
        }
    }

    fn on_registration(
        &mut self,
        src: LinkAddr,
        role: Role,
        now: u64,
        radio: &mut dyn RadioPort,
        events: &mut dyn EventSink,
    ) {
        match role {
            Role::SensorNode => match self.registry.add(src, now) {
                Ok(AddOutcome::Added) => {
                    info!(
                        "Sink: sensor {} registered ({}/{})",
                        src,
                        self.registry.len(),
                        self.registry.capacity()
                    );
                    events.emit(&AppEvent::SensorRegistered(src));
                    self.ack(src, radio);
                }
                Ok(AddOutcome::AlreadyPresent) => {
                    debug!("Sink: sensor {} re-registered", src);
                    self.registry.touch(src, now);
                    self.ack(src, radio);
                }
                Err(RegistryError::CapacityExceeded) => {
                    events.emit(&AppEvent::SensorRejected(src));
                }
            },
            Role::Actuator => match self.actuator.map(|a| a.address) {
                None => {
                    self.actuator = Some(ActuatorLink {
                        address: src,
                        last_seen_secs: now,
                    });
                    events.emit(&AppEvent::ActuatorRegistered(src));
                    self.ack(src, radio);
                }
                Some(known) if known == src => {
                    debug!("Sink: actuator {} re-registered", src);
                    self.actuator = Some(ActuatorLink {
                        address: src,
                        last_seen_secs: now,
                    });
                    self.ack(src, radio);
                }
                Some(registered) => {
                    events.emit(&AppEvent::ActuatorConflict {
                        registered,
                        claimant: src,
                    });
                }
            },
        }
    }

    fn on_actuator_frame(
        &mut self,
        src: LinkAddr,
        payload: &[u8],
        now: u64,
        events: &mut dyn EventSink,
    ) {
        let kind = if payload.len() == MessageKind::Heartbeat.wire_len() {
            MessageKind::Heartbeat
        } else {
            MessageKind::ActuatorStatus
        };
        let msg = match decode(kind, self.token, payload) {
            Ok(msg) => msg,
            Err(e) => {
                self.drop_frame(src, e.into(), events);
                return;
            }
        };

        if let Some(link) = self.actuator.as_mut() {
            link.last_seen_secs = now;
        }
        match msg {
            Message::Heartbeat => events.emit(&AppEvent::HeartbeatReceived(src)),
            Message::ActuatorStatus(status) => events.emit(&AppEvent::ActuatorStatus(status)),
            _ => self.drop_frame(src, DropReason::Unexpected, events),
        }
    }

    fn on_report(
        &mut self,
        src: LinkAddr,
        values: Measurements,
        radio: &mut dyn RadioPort,
        events: &mut dyn EventSink,
    ) {
        self.stats.reports = self.stats.reports.wrapping_add(1);
        events.emit(&AppEvent::ReadingReceived(SensorReading {
            source: src,
            values,
        }));

        let decision = self.engine.decide(&values, self.differ.last_sent());
        for advisory in &decision.advisories {
            match *advisory {
                Advisory::SensorFault { metric, value } => {
                    events.emit(&AppEvent::SensorFault {
                        source: src,
                        metric,
                        value,
                    });
                }
                Advisory::LowBattery { battery_mv } => {
                    events.emit(&AppEvent::LowBattery {
                        source: src,
                        battery_mv,
                    });
                }
            }
        }

        match self
            .differ
            .apply(decision.command, self.actuator.map(|a| a.address))
        {
            DiffOutcome::Unchanged => {}
            DiffOutcome::Held(command) => {
                self.stats.commands_held = self.stats.commands_held.wrapping_add(1);
                events.emit(&AppEvent::CommandHeld(command));
            }
            DiffOutcome::Send { to, command } => {
                radio.send_message(self.token, to, &Message::ActuatorCommand(command));
                self.stats.commands_sent = self.stats.commands_sent.wrapping_add(1);
                events.emit(&AppEvent::CommandSent { to, command });
            }
        }
    }

    // ── Liveness ──────────────────────────────────────────────

    /// Run one liveness sweep.
    pub fn on_liveness_tick(&mut self, now: u64, events: &mut dyn EventSink) {
        let report = self
            .liveness
            .sweep(now, &mut self.registry, &mut self.actuator);

        for silent in &report.evicted {
            self.stats.evictions = self.stats.evictions.wrapping_add(1);
            events.emit(&AppEvent::SensorEvicted {
                addr: silent.address,
                silent_secs: silent.silent_secs,
            });
        }
        if let Some(silent) = report.actuator_lost {
            events.emit(&AppEvent::ActuatorLost {
                addr: silent.address,
                silent_secs: silent.silent_secs,
            });
        }
    }

    // ── Helpers ───────────────────────────────────────────────

    fn ack(&self, dest: LinkAddr, radio: &mut dyn RadioPort) {
        radio.send_message(self.token, dest, &Message::RegistrationAck);
    }

    fn drop_frame(&mut self, src: LinkAddr, reason: DropReason, events: &mut dyn EventSink) {
        self.stats.dropped = self.stats.dropped.wrapping_add(1);
        events.emit(&AppEvent::FrameDropped { src, reason });
    }
}

impl Node for SinkService {
    type Timer = SinkTimer;

    fn start(&mut self, cx: &mut NodeCtx<'_, SinkTimer>) {
        let period_secs = self.liveness_period_secs;
        if !cx
            .timers
            .arm(SinkTimer::Liveness, TimerKind::Periodic { period_secs }, cx.now)
        {
            warn!("Sink: could not arm liveness timer");
        }
        cx.events.emit(&AppEvent::Started {
            role: NodeRole::Sink,
            addr: cx.radio.local_addr(),
        });
    }

    fn handle(&mut self, event: Event<SinkTimer>, cx: &mut NodeCtx<'_, SinkTimer>) {
        match event {
            Event::Frame(frame) => self.on_frame(&frame, cx.now, cx.radio, cx.events),
            Event::Timer(SinkTimer::Liveness) => self.on_liveness_tick(cx.now, cx.events),
            Event::Input(cmd) => debug!("Sink: ignoring local input {:?}", cmd),
        }
    }
}
