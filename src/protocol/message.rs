//! Message vocabulary shared by the sink, sensor nodes and the actuator.

use serde::{Deserialize, Serialize};

use super::addr::LinkAddr;

/// Shared capability token. A plain equality check at the protocol
/// boundary; it authenticates nothing cryptographically.
pub type Token = u32;

/// Token every node ships with unless configured otherwise.
pub const DEFAULT_TOKEN: Token = 123_456_789;

/// Size of the token prefix carried by every frame.
pub const TOKEN_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The kind a receiver expects, inferred from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Registration,
    RegistrationAck,
    Heartbeat,
    SensorReport,
    ActuatorCommand,
    ActuatorStatus,
}

impl MessageKind {
    /// Exact on-air size of this kind, token included.
    pub const fn wire_len(self) -> usize {
        match self {
            Self::Registration | Self::ActuatorStatus => TOKEN_LEN + 1,
            Self::RegistrationAck | Self::Heartbeat => TOKEN_LEN,
            Self::SensorReport => TOKEN_LEN + 8,
            Self::ActuatorCommand => TOKEN_LEN + 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// What a registering node claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Role {
    SensorNode = 0,
    Actuator = 1,
}

impl Role {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::SensorNode),
            1 => Some(Self::Actuator),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Channels and fault status
// ---------------------------------------------------------------------------

/// One of the three independently controllable actuator functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Channel {
    Irrigation = 0,
    Windows = 1,
    Lights = 2,
}

impl Channel {
    pub const COUNT: usize = 3;

    /// All channels in repair-priority order.
    pub const ALL: [Channel; Channel::COUNT] = [Self::Irrigation, Self::Windows, Self::Lights];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Irrigation => "irrigation",
            Self::Windows => "windows",
            Self::Lights => "lights",
        }
    }
}

/// Break / repair notification sent by the actuator to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FaultStatus {
    IrrigationBroken = 0,
    IrrigationOk = 1,
    WindowsBroken = 2,
    WindowsOk = 3,
    LightsBroken = 4,
    LightsOk = 5,
}

impl FaultStatus {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::IrrigationBroken),
            1 => Some(Self::IrrigationOk),
            2 => Some(Self::WindowsBroken),
            3 => Some(Self::WindowsOk),
            4 => Some(Self::LightsBroken),
            5 => Some(Self::LightsOk),
            _ => None,
        }
    }

    pub const fn broken(channel: Channel) -> Self {
        match channel {
            Channel::Irrigation => Self::IrrigationBroken,
            Channel::Windows => Self::WindowsBroken,
            Channel::Lights => Self::LightsBroken,
        }
    }

    pub const fn ok(channel: Channel) -> Self {
        match channel {
            Channel::Irrigation => Self::IrrigationOk,
            Channel::Windows => Self::WindowsOk,
            Channel::Lights => Self::LightsOk,
        }
    }

    pub const fn channel(self) -> Channel {
        match self {
            Self::IrrigationBroken | Self::IrrigationOk => Channel::Irrigation,
            Self::WindowsBroken | Self::WindowsOk => Channel::Windows,
            Self::LightsBroken | Self::LightsOk => Channel::Lights,
        }
    }

    pub const fn is_broken(self) -> bool {
        matches!(
            self,
            Self::IrrigationBroken | Self::WindowsBroken | Self::LightsBroken
        )
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Raw metric values carried by a sensor report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Measurements {
    pub temperature: i16,
    pub humidity: u16,
    pub light: i16,
    pub battery_mv: i16,
}

/// A report as seen by the sink: measurements plus who sent them.
/// Consumed once by the decision engine; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub source: LinkAddr,
    pub values: Measurements,
}

/// Desired actuator state. The sink keeps exactly one authoritative
/// "last sent" copy; the default is everything off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub open_window: bool,
    pub open_irrigation: bool,
    pub darken: bool,
}

impl ActuatorCommand {
    /// The command field that drives `channel`.
    pub const fn get(&self, channel: Channel) -> bool {
        match channel {
            Channel::Irrigation => self.open_irrigation,
            Channel::Windows => self.open_window,
            Channel::Lights => self.darken,
        }
    }

    pub fn set(&mut self, channel: Channel, on: bool) {
        match channel {
            Channel::Irrigation => self.open_irrigation = on,
            Channel::Windows => self.open_window = on,
            Channel::Lights => self.darken = on,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A decoded protocol message (token already verified and stripped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Registration { role: Role },
    RegistrationAck,
    Heartbeat,
    SensorReport(Measurements),
    ActuatorCommand(ActuatorCommand),
    ActuatorStatus(FaultStatus),
}

impl Message {
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Registration { .. } => MessageKind::Registration,
            Self::RegistrationAck => MessageKind::RegistrationAck,
            Self::Heartbeat => MessageKind::Heartbeat,
            Self::SensorReport(_) => MessageKind::SensorReport,
            Self::ActuatorCommand(_) => MessageKind::ActuatorCommand,
            Self::ActuatorStatus(_) => MessageKind::ActuatorStatus,
        }
    }
}
