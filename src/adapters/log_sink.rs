//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every application event as one log
//! line with a fixed tag. A dashboard or serial-console adapter would
//! implement the same trait.
//!
//! | Tag     | Events                                        |
//! |---------|-----------------------------------------------|
//! | `START` | node started                                  |
//! | `REG`   | registrations, rejections, conflicts          |
//! | `LIVE`  | evictions, lost actuator, heartbeats          |
//! | `DATA`  | readings and reports                          |
//! | `CMD`   | commands sent or held                         |
//! | `FAULT` | sensor faults, low battery, actuator status   |
//! | `CHAN`  | actuator channel changes                      |
//! | `LINK`  | leaf-node join lifecycle, period changes      |
//! | `DROP`  | discarded frames                              |

use log::{debug, info, warn};

use crate::app::events::{AppEvent, DropReason};
use crate::app::ports::EventSink;
use crate::protocol::ActuatorCommand;

/// Adapter that logs every [`AppEvent`], prefixed with the node's name.
pub struct LogEventSink {
    node: &'static str,
}

impl LogEventSink {
    pub fn new(node: &'static str) -> Self {
        Self { node }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn describe(cmd: &ActuatorCommand) -> (&'static str, &'static str, &'static str) {
    (
        if cmd.open_window { "open" } else { "closed" },
        on_off(cmd.open_irrigation),
        on_off(cmd.darken),
    )
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let n = self.node;
        match event {
            AppEvent::Started { role, addr } => {
                info!("[{}] START | {:?} at {}", n, role, addr);
            }

            AppEvent::SensorRegistered(addr) => info!("[{}] REG   | sensor {} added", n, addr),
            AppEvent::SensorRejected(addr) => {
                warn!("[{}] REG   | sensor {} rejected, registry full", n, addr);
            }
            AppEvent::ActuatorRegistered(addr) => info!("[{}] REG   | actuator {}", n, addr),
            AppEvent::ActuatorConflict {
                registered,
                claimant,
            } => {
                warn!(
                    "[{}] REG   | actuator {} ignored, {} already registered",
                    n, claimant, registered
                );
            }

            AppEvent::SensorEvicted { addr, silent_secs } => {
                info!("[{}] LIVE  | sensor {} evicted after {} s", n, addr, silent_secs);
            }
            AppEvent::ActuatorLost { addr, silent_secs } => {
                warn!("[{}] LIVE  | actuator {} silent for {} s", n, addr, silent_secs);
            }
            AppEvent::HeartbeatReceived(addr) => debug!("[{}] LIVE  | heartbeat from {}", n, addr),
            AppEvent::HeartbeatSent => debug!("[{}] LIVE  | heartbeat sent", n),

            AppEvent::ReadingReceived(r) => {
                info!(
                    "[{}] DATA  | {} T={} H={} L={} V={}mV",
                    n,
                    r.source,
                    r.values.temperature,
                    r.values.humidity,
                    r.values.light,
                    r.values.battery_mv
                );
            }
            AppEvent::ReportSent(m) => {
                info!(
                    "[{}] DATA  | report T={} H={} L={} V={}mV",
                    n, m.temperature, m.humidity, m.light, m.battery_mv
                );
            }

            AppEvent::CommandSent { to, command } => {
                let (w, i, l) = describe(command);
                info!("[{}] CMD   | to {}: windows {} irrigation {} lights {}", n, to, w, i, l);
            }
            AppEvent::CommandHeld(command) => {
                let (w, i, l) = describe(command);
                info!(
                    "[{}] CMD   | held, no actuator: windows {} irrigation {} lights {}",
                    n, w, i, l
                );
            }

            AppEvent::SensorFault {
                source,
                metric,
                value,
            } => {
                warn!(
                    "[{}] FAULT | {} sensor on {} may be broken (read {})",
                    n,
                    metric.name(),
                    source,
                    value
                );
            }
            AppEvent::LowBattery { source, battery_mv } => {
                warn!("[{}] FAULT | change battery on {} ({} mV)", n, source, battery_mv);
            }
            AppEvent::ActuatorStatus(status) => {
                if status.is_broken() {
                    warn!("[{}] FAULT | actuator reports {} broken", n, status.channel().name());
                } else {
                    info!("[{}] FAULT | actuator reports {} repaired", n, status.channel().name());
                }
            }

            AppEvent::ChannelSwitched { channel, on } => {
                info!("[{}] CHAN  | {} {}", n, channel.name(), on_off(*on));
            }
            AppEvent::ChannelDeferred {
                channel,
                pending_on,
            } => {
                warn!(
                    "[{}] CHAN  | {} broken, will be {} on repair",
                    n,
                    channel.name(),
                    on_off(*pending_on)
                );
            }
            AppEvent::ChannelBroken { channel, was_on } => {
                warn!("[{}] CHAN  | {} broken (was {})", n, channel.name(), on_off(*was_on));
            }
            AppEvent::ChannelRepaired { channel, resumed } => {
                info!(
                    "[{}] CHAN  | {} repaired{}",
                    n,
                    channel.name(),
                    if *resumed { ", resumed" } else { "" }
                );
            }

            AppEvent::Joining {
                attempt,
                max_attempts,
            } => info!("[{}] LINK  | looking for sink ({}/{})", n, attempt, max_attempts),
            AppEvent::Joined { sink } => info!("[{}] LINK  | joined sink {}", n, sink),
            AppEvent::JoinFailed => warn!("[{}] LINK  | no sink found, giving up", n),
            AppEvent::Disconnected => info!("[{}] LINK  | disconnected", n),
            AppEvent::PeriodChanged { kind, secs } => {
                info!("[{}] LINK  | {:?} period now {} s", n, kind, secs);
            }

            AppEvent::FrameDropped { src, reason } => match reason {
                DropReason::Intruder => warn!("[{}] DROP  | {}: possible intruder", n, src),
                DropReason::Malformed(e) => warn!("[{}] DROP  | {}: {}", n, src, e),
                DropReason::UnknownSource => debug!("[{}] DROP  | {}: unknown source", n, src),
                DropReason::Unexpected => debug!("[{}] DROP  | {}: unexpected", n, src),
            },
        }
    }
}
