//! Shared radio protocol.
//!
//! Every node speaks the same fixed-width little-endian wire format. There
//! is no kind tag on the wire: a receiver decides which kind it expects
//! from context (broadcast vs unicast, who sent it, its own link state)
//! and the codec validates the frame against that kind only.
//!
//! ```text
//! ┌───────────────────┬──────────────────────────────────────────────┐
//! │ Kind              │ Layout (bytes)                               │
//! ├───────────────────┼──────────────────────────────────────────────┤
//! │ Registration      │ token(4) role(1)                             │
//! │ RegistrationAck   │ token(4)                                     │
//! │ Heartbeat         │ token(4)                                     │
//! │ SensorReport      │ token(4) temp(i16) hum(u16) light(i16) mv(i16)│
//! │ ActuatorCommand   │ token(4) window(1) irrigation(1) darken(1)   │
//! │ ActuatorStatus    │ token(4) fault(1)                            │
//! └───────────────────┴──────────────────────────────────────────────┘
//! ```

pub mod addr;
pub mod codec;
pub mod message;

pub use addr::LinkAddr;
pub use codec::{Frame, MAX_FRAME_LEN, decode, encode};
pub use message::{
    ActuatorCommand, Channel, DEFAULT_TOKEN, FaultStatus, Measurements, Message, MessageKind,
    Role, SensorReading, Token,
};
