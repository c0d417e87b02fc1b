//! Outbound application events.
//!
//! Node services emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: log to the console, count them in a
//! test, forward them to a dashboard.

use crate::error::ProtocolError;
use crate::protocol::message::{Channel, Measurements};
use crate::protocol::{ActuatorCommand, FaultStatus, LinkAddr, SensorReading};
use crate::sink::decision::Metric;

/// Which kind of node emitted an event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Sink,
    Actuator,
    Sensor,
}

/// Why an inbound frame was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Token mismatch.
    Intruder,
    /// Wrong size or unknown tag for the expected kind.
    Malformed(ProtocolError),
    /// Unicast from an address this node does not know.
    UnknownSource,
    /// Valid frame that this node's current state has no use for.
    Unexpected,
}

impl From<ProtocolError> for DropReason {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::AuthFailure => Self::Intruder,
            other => Self::Malformed(other),
        }
    }
}

/// Which sensor-node period a runtime setting changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Sampling,
    Reporting,
}

/// Structured events emitted by the node services.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A node service started (carries its role and address).
    Started { role: NodeRole, addr: LinkAddr },

    // ── Sink: registration and liveness ───────────────────────
    SensorRegistered(LinkAddr),
    /// Registry full; no ack was sent.
    SensorRejected(LinkAddr),
    ActuatorRegistered(LinkAddr),
    /// A second actuator tried to register while one is known.
    ActuatorConflict { registered: LinkAddr, claimant: LinkAddr },
    SensorEvicted { addr: LinkAddr, silent_secs: u64 },
    ActuatorLost { addr: LinkAddr, silent_secs: u64 },

    // ── Sink: data path ───────────────────────────────────────
    ReadingReceived(SensorReading),
    /// Reading outside the metric's plausible range; excluded this cycle.
    SensorFault { source: LinkAddr, metric: Metric, value: i32 },
    LowBattery { source: LinkAddr, battery_mv: i16 },
    CommandSent { to: LinkAddr, command: ActuatorCommand },
    /// The decision changed but no actuator is registered to receive it.
    CommandHeld(ActuatorCommand),
    HeartbeatReceived(LinkAddr),
    ActuatorStatus(FaultStatus),

    // ── Any node ──────────────────────────────────────────────
    FrameDropped { src: LinkAddr, reason: DropReason },

    // ── Leaf nodes: link lifecycle ────────────────────────────
    Joining { attempt: u8, max_attempts: u8 },
    Joined { sink: LinkAddr },
    JoinFailed,
    Disconnected,

    // ── Actuator: channels ────────────────────────────────────
    ChannelSwitched { channel: Channel, on: bool },
    /// Command arrived for a broken channel; remembered for repair.
    ChannelDeferred { channel: Channel, pending_on: bool },
    ChannelBroken { channel: Channel, was_on: bool },
    ChannelRepaired { channel: Channel, resumed: bool },
    HeartbeatSent,

    // ── Sensor node ───────────────────────────────────────────
    ReportSent(Measurements),
    PeriodChanged { kind: PeriodKind, secs: u64 },
}
