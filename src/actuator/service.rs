//! Actuator node service.
//!
//! Joins the sink, then sends a heartbeat every period and applies the
//! commands the sink sends. Break and repair come from local input and
//! are reported back to the sink as [`FaultStatus`](crate::protocol::FaultStatus)
//! frames.

use log::{debug, warn};
use rand::RngCore;

use crate::app::commands::AppCommand;
use crate::app::events::{AppEvent, DropReason, NodeRole};
use crate::app::join::{Joiner, LinkState};
use crate::app::ports::{EventSink, IndicatorPort, RadioPort};
use crate::app::runtime::{Node, NodeCtx};
use crate::config::ActuatorConfig;
use crate::events::{Event, Inbound};
use crate::protocol::codec::decode;
use crate::protocol::{ActuatorCommand, FaultStatus, LinkAddr, Message, MessageKind, Role, Token};
use crate::scheduler::{Scheduler, TimerKind};

use super::channel::ApplyOutcome;
use super::state_machine::ActuatorStateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorTimer {
    JoinRetry,
    Heartbeat,
}

pub struct ActuatorService<I, R> {
    token: Token,
    heartbeat_period_secs: u64,
    joiner: Joiner,
    machine: ActuatorStateMachine,
    indicators: I,
    rng: R,
}

impl<I: IndicatorPort, R: RngCore> ActuatorService<I, R> {
    pub fn new(config: &ActuatorConfig, indicators: I, rng: R) -> Self {
        Self {
            token: config.token,
            heartbeat_period_secs: config.heartbeat_period_secs,
            joiner: Joiner::new(Role::Actuator, config.token, config.join),
            machine: ActuatorStateMachine::new(),
            indicators,
            rng,
        }
    }

    pub fn link_state(&self) -> LinkState {
        self.joiner.state()
    }

    pub fn machine(&self) -> &ActuatorStateMachine {
        &self.machine
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    // ── Local input ───────────────────────────────────────────

    pub fn on_input(&mut self, command: AppCommand, cx: &mut NodeCtx<'_, ActuatorTimer>) {
        match command {
            AppCommand::Connect => {
                if self.joiner.connect(cx.radio, cx.events) {
                    self.arm_retry(cx.timers, cx.now);
                }
            }
            AppCommand::BreakRandom => self.break_random(cx.radio, cx.events),
            AppCommand::Repair => self.repair(cx.radio, cx.events),
            other => debug!("Actuator: ignoring {:?}", other),
        }
    }

    fn break_random(&mut self, radio: &mut dyn RadioPort, events: &mut dyn EventSink) {
        if !self.joiner.is_joined() {
            debug!("Actuator: break ignored while not joined");
            return;
        }
        let Some(breakage) = self.machine.break_random(&mut self.rng) else {
            debug!("Actuator: every channel is already broken");
            return;
        };
        self.refresh_indicators();
        events.emit(&AppEvent::ChannelBroken {
            channel: breakage.channel,
            was_on: breakage.was_on,
        });
        self.report(breakage.status(), radio);
    }

    fn repair(&mut self, radio: &mut dyn RadioPort, events: &mut dyn EventSink) {
        let Some(repair) = self.machine.repair_next() else {
            debug!("Actuator: nothing to repair");
            return;
        };
        self.refresh_indicators();
        events.emit(&AppEvent::ChannelRepaired {
            channel: repair.channel,
            resumed: repair.resumed,
        });
        self.report(repair.status(), radio);
    }

    /// Send a fault status to the sink, if there is one to send to.
    fn report(&self, status: FaultStatus, radio: &mut dyn RadioPort) {
        match self.joiner.sink() {
            Some(sink) => radio.send_message(self.token, sink, &Message::ActuatorStatus(status)),
            None => warn!("Actuator: {:?} not reported, no sink", status),
        }
    }

    // ── Inbound frames ────────────────────────────────────────

    pub fn on_frame(&mut self, frame: &Inbound, cx: &mut NodeCtx<'_, ActuatorTimer>) {
        if frame.is_broadcast() {
            debug!("Actuator: ignoring broadcast from {}", frame.src);
            return;
        }
        let src = frame.src;
        let payload = frame.payload.as_slice();

        match self.joiner.state() {
            LinkState::Joining { .. } => match self.joiner.accept_ack(src, payload, cx.events) {
                Ok(_) => {
                    cx.timers.cancel(ActuatorTimer::JoinRetry);
                    cx.timers.arm(
                        ActuatorTimer::Heartbeat,
                        TimerKind::Periodic {
                            period_secs: self.heartbeat_period_secs,
                        },
                        cx.now,
                    );
                }
                Err(reason) => drop_frame(src, reason, cx.events),
            },
            LinkState::Joined { sink } if sink == src => {
                match decode(MessageKind::ActuatorCommand, self.token, payload) {
                    Ok(Message::ActuatorCommand(command)) => self.apply(&command, cx.events),
                    Ok(_) => drop_frame(src, DropReason::Unexpected, cx.events),
                    Err(e) => drop_frame(src, e.into(), cx.events),
                }
            }
            LinkState::Joined { .. } => drop_frame(src, DropReason::UnknownSource, cx.events),
            LinkState::Disconnected => drop_frame(src, DropReason::Unexpected, cx.events),
        }
    }

    fn apply(&mut self, command: &ActuatorCommand, events: &mut dyn EventSink) {
        let changes = self.machine.apply_command(command);
        for change in &changes {
            match change.outcome {
                ApplyOutcome::Switched(on) => events.emit(&AppEvent::ChannelSwitched {
                    channel: change.channel,
                    on,
                }),
                ApplyOutcome::Deferred(pending_on) => events.emit(&AppEvent::ChannelDeferred {
                    channel: change.channel,
                    pending_on,
                }),
                ApplyOutcome::Unchanged => {}
            }
        }
        if !changes.is_empty() {
            self.refresh_indicators();
        }
    }

    // ── Timers ────────────────────────────────────────────────

    pub fn on_timer(&mut self, timer: ActuatorTimer, cx: &mut NodeCtx<'_, ActuatorTimer>) {
        match timer {
            ActuatorTimer::JoinRetry => {
                if self.joiner.on_retry(cx.radio, cx.events) {
                    self.arm_retry(cx.timers, cx.now);
                }
            }
            ActuatorTimer::Heartbeat => match self.joiner.sink() {
                Some(sink) => {
                    cx.radio.send_message(self.token, sink, &Message::Heartbeat);
                    cx.events.emit(&AppEvent::HeartbeatSent);
                }
                None => {
                    cx.timers.cancel(ActuatorTimer::Heartbeat);
                }
            },
        }
    }

    fn arm_retry(&self, timers: &mut Scheduler<ActuatorTimer>, now: u64) {
        timers.arm(
            ActuatorTimer::JoinRetry,
            TimerKind::OneShot {
                delay_secs: self.joiner.retry_secs(),
            },
            now,
        );
    }

    fn refresh_indicators(&mut self) {
        let state = self.machine.indicators();
        self.indicators.show(state);
    }
}

fn drop_frame(src: LinkAddr, reason: DropReason, events: &mut dyn EventSink) {
    events.emit(&AppEvent::FrameDropped { src, reason });
}

impl<I: IndicatorPort, R: RngCore> Node for ActuatorService<I, R> {
    type Timer = ActuatorTimer;

    fn start(&mut self, cx: &mut NodeCtx<'_, ActuatorTimer>) {
        self.refresh_indicators();
        cx.events.emit(&AppEvent::Started {
            role: NodeRole::Actuator,
            addr: cx.radio.local_addr(),
        });
    }

    fn handle(&mut self, event: Event<ActuatorTimer>, cx: &mut NodeCtx<'_, ActuatorTimer>) {
        match event {
            Event::Frame(frame) => self.on_frame(&frame, cx),
            Event::Timer(timer) => self.on_timer(timer, cx),
            Event::Input(command) => self.on_input(command, cx),
        }
    }
}
