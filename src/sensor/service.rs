//! Sensor node service.
//!
//! Once joined, a sampling timer folds raw samples into running means and
//! a reporting timer sends those means to the sink. The status LEDs show
//! the link state:
//!
//! | Link state   | Red | Green |
//! |--------------|-----|-------|
//! | Disconnected | on  | off   |
//! | Joining      | off | on    |
//! | Joined       | off | off   |

use log::{debug, warn};

use crate::app::commands::AppCommand;
use crate::app::events::{AppEvent, DropReason, NodeRole, PeriodKind};
use crate::app::join::{Joiner, LinkState};
use crate::app::ports::{IndicatorPort, Indicators, SamplePort};
use crate::app::runtime::{Node, NodeCtx};
use crate::config::{PERIOD_RANGE_SECS, SensorConfig};
use crate::events::{Event, Inbound};
use crate::protocol::{Message, Role, Token};
use crate::scheduler::{Scheduler, TimerKind};

use super::sampler::Sampler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorTimer {
    JoinRetry,
    Sample,
    Report,
}

pub struct SensorService<I, S> {
    token: Token,
    sampling_period_secs: u64,
    reporting_period_secs: u64,
    joiner: Joiner,
    sampler: Sampler,
    indicators: I,
    source: S,
}

impl<I: IndicatorPort, S: SamplePort> SensorService<I, S> {
    pub fn new(config: &SensorConfig, indicators: I, source: S) -> Self {
        Self {
            token: config.token,
            sampling_period_secs: config.sampling_period_secs,
            reporting_period_secs: config.reporting_period_secs,
            joiner: Joiner::new(Role::SensorNode, config.token, config.join),
            sampler: Sampler::new(),
            indicators,
            source,
        }
    }

    pub fn link_state(&self) -> LinkState {
        self.joiner.state()
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn periods(&self) -> (u64, u64) {
        (self.sampling_period_secs, self.reporting_period_secs)
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }

    /// LED state for the current link state.
    pub fn status_indicators(&self) -> Indicators {
        match self.joiner.state() {
            LinkState::Disconnected => Indicators {
                green: false,
                red: true,
            },
            LinkState::Joining { .. } => Indicators {
                green: true,
                red: false,
            },
            LinkState::Joined { .. } => Indicators::OFF,
        }
    }

    fn refresh_status(&mut self) {
        let state = self.status_indicators();
        self.indicators.show(state);
    }

    // ── Local input ───────────────────────────────────────────

    pub fn on_input(&mut self, command: AppCommand, cx: &mut NodeCtx<'_, SensorTimer>) {
        match command {
            AppCommand::Connect => {
                if self.joiner.connect(cx.radio, cx.events) {
                    self.arm_retry(cx.timers, cx.now);
                }
            }
            AppCommand::Disconnect => {
                for timer in [SensorTimer::JoinRetry, SensorTimer::Sample, SensorTimer::Report] {
                    cx.timers.cancel(timer);
                }
                self.joiner.disconnect(cx.events);
            }
            AppCommand::Perturb => {
                if self.joiner.is_joined() {
                    let means = self.sampler.perturb();
                    debug!("Sensor: perturbed means now {:?}", means);
                } else {
                    debug!("Sensor: perturb ignored while {:?}", self.joiner.state());
                }
            }
            AppCommand::SetSamplingPeriod(secs) => {
                self.set_period(PeriodKind::Sampling, secs, cx);
            }
            AppCommand::SetReportingPeriod(secs) => {
                self.set_period(PeriodKind::Reporting, secs, cx);
            }
            other => debug!("Sensor: ignoring {:?}", other),
        }
        self.refresh_status();
    }

    fn set_period(&mut self, kind: PeriodKind, secs: u64, cx: &mut NodeCtx<'_, SensorTimer>) {
        if !PERIOD_RANGE_SECS.contains(&secs) {
            warn!(
                "Sensor: {:?} period {} s outside {}..={} s",
                kind,
                secs,
                PERIOD_RANGE_SECS.start(),
                PERIOD_RANGE_SECS.end()
            );
            return;
        }
        match kind {
            PeriodKind::Sampling => self.sampling_period_secs = secs,
            PeriodKind::Reporting => self.reporting_period_secs = secs,
        }
        cx.events.emit(&AppEvent::PeriodChanged { kind, secs });
        if self.joiner.is_joined() {
            self.start_measuring(cx.timers, cx.now);
        }
    }

    // ── Inbound frames ────────────────────────────────────────

    pub fn on_frame(&mut self, frame: &Inbound, cx: &mut NodeCtx<'_, SensorTimer>) {
        if frame.is_broadcast() {
            debug!("Sensor: ignoring broadcast from {}", frame.src);
            return;
        }
        let src = frame.src;
        match self.joiner.state() {
            LinkState::Joining { .. } => {
                match self
                    .joiner
                    .accept_ack(src, frame.payload.as_slice(), cx.events)
                {
                    Ok(_) => {
                        cx.timers.cancel(SensorTimer::JoinRetry);
                        self.start_measuring(cx.timers, cx.now);
                        self.refresh_status();
                    }
                    Err(reason) => cx.events.emit(&AppEvent::FrameDropped { src, reason }),
                }
            }
            _ => cx.events.emit(&AppEvent::FrameDropped {
                src,
                reason: DropReason::Unexpected,
            }),
        }
    }

    // ── Timers ────────────────────────────────────────────────

    pub fn on_timer(&mut self, timer: SensorTimer, cx: &mut NodeCtx<'_, SensorTimer>) {
        match timer {
            SensorTimer::JoinRetry => {
                if self.joiner.on_retry(cx.radio, cx.events) {
                    self.arm_retry(cx.timers, cx.now);
                } else {
                    self.refresh_status();
                }
            }
            SensorTimer::Sample => {
                let raw = self.source.sample();
                self.sampler.fold(&raw);
            }
            SensorTimer::Report => {
                let Some(sink) = self.joiner.sink() else {
                    cx.timers.cancel(SensorTimer::Report);
                    return;
                };
                let means = self.sampler.means();
                cx.radio
                    .send_message(self.token, sink, &Message::SensorReport(means));
                cx.events.emit(&AppEvent::ReportSent(means));
            }
        }
    }

    fn start_measuring(&self, timers: &mut Scheduler<SensorTimer>, now: u64) {
        timers.arm(
            SensorTimer::Sample,
            TimerKind::Periodic {
                period_secs: self.sampling_period_secs,
            },
            now,
        );
        timers.arm(
            SensorTimer::Report,
            TimerKind::Periodic {
                period_secs: self.reporting_period_secs,
            },
            now,
        );
    }

    fn arm_retry(&self, timers: &mut Scheduler<SensorTimer>, now: u64) {
        timers.arm(
            SensorTimer::JoinRetry,
            TimerKind::OneShot {
                delay_secs: self.joiner.retry_secs(),
            },
            now,
        );
    }
}

impl<I: IndicatorPort, S: SamplePort> Node for SensorService<I, S> {
    type Timer = SensorTimer;

    fn start(&mut self, cx: &mut NodeCtx<'_, SensorTimer>) {
        self.refresh_status();
        cx.events.emit(&AppEvent::Started {
            role: NodeRole::Sensor,
            addr: cx.radio.local_addr(),
        });
    }

    fn handle(&mut self, event: Event<SensorTimer>, cx: &mut NodeCtx<'_, SensorTimer>) {
        match event {
            Event::Frame(frame) => self.on_frame(&frame, cx),
            Event::Timer(timer) => self.on_timer(timer, cx),
            Event::Input(command) => self.on_input(command, cx),
        }
    }
}
