//! Fixed-width frame codec.
//!
//! Every integer is little-endian. Booleans occupy one byte; any non-zero
//! value decodes as `true`. Decoding always runs in the same order:
//!
//! 1. at least a token's worth of bytes, else `Malformed`
//! 2. token equality, else `AuthFailure`
//! 3. exact size for the expected kind, else `Malformed`
//! 4. enum tags, else `UnknownRole` / `UnknownFaultStatus`

use heapless::Vec;

use crate::error::ProtocolError;

use super::message::{
    ActuatorCommand, FaultStatus, Measurements, Message, MessageKind, Role, TOKEN_LEN, Token,
};

/// Largest frame any node ever sends (a sensor report is 12 bytes).
pub const MAX_FRAME_LEN: usize = 16;

/// An encoded frame, ready for the radio.
pub type Frame = Vec<u8, MAX_FRAME_LEN>;

/// Read the token prefix without validating anything else.
pub fn peek_token(bytes: &[u8]) -> Option<Token> {
    let head: [u8; TOKEN_LEN] = bytes.get(..TOKEN_LEN)?.try_into().ok()?;
    Some(Token::from_le_bytes(head))
}

/// Verify the capability token before any other processing.
///
/// A frame too short to carry a token is reported as malformed for
/// `kind`, the smallest thing the receiver could have expected.
pub fn check_token(expected: Token, kind: MessageKind, bytes: &[u8]) -> Result<(), ProtocolError> {
    match peek_token(bytes) {
        None => Err(ProtocolError::Malformed {
            kind,
            expected: kind.wire_len(),
            actual: bytes.len(),
        }),
        Some(t) if t != expected => Err(ProtocolError::AuthFailure),
        Some(_) => Ok(()),
    }
}

/// Decode `bytes` as `kind`, checking the token and exact length.
pub fn decode(kind: MessageKind, token: Token, bytes: &[u8]) -> Result<Message, ProtocolError> {
    check_token(token, kind, bytes)?;

    let expected = kind.wire_len();
    if bytes.len() != expected {
        return Err(ProtocolError::Malformed {
            kind,
            expected,
            actual: bytes.len(),
        });
    }
    let body = &bytes[TOKEN_LEN..];

    let msg = match kind {
        MessageKind::Registration => {
            let role = Role::from_tag(body[0]).ok_or(ProtocolError::UnknownRole(body[0]))?;
            Message::Registration { role }
        }
        MessageKind::RegistrationAck => Message::RegistrationAck,
        MessageKind::Heartbeat => Message::Heartbeat,
        MessageKind::SensorReport => Message::SensorReport(Measurements {
            temperature: i16::from_le_bytes([body[0], body[1]]),
            humidity: u16::from_le_bytes([body[2], body[3]]),
            light: i16::from_le_bytes([body[4], body[5]]),
            battery_mv: i16::from_le_bytes([body[6], body[7]]),
        }),
        MessageKind::ActuatorCommand => Message::ActuatorCommand(ActuatorCommand {
            open_window: body[0] != 0,
            open_irrigation: body[1] != 0,
            darken: body[2] != 0,
        }),
        MessageKind::ActuatorStatus => {
            let status = FaultStatus::from_tag(body[0])
                .ok_or(ProtocolError::UnknownFaultStatus(body[0]))?;
            Message::ActuatorStatus(status)
        }
    };
    Ok(msg)
}

/// Encode `msg` into `out`, returning the number of bytes written.
pub fn encode_into(token: Token, msg: &Message, out: &mut [u8]) -> Result<usize, ProtocolError> {
    let len = msg.kind().wire_len();
    let out = out.get_mut(..len).ok_or(ProtocolError::BufferTooSmall)?;

    out[..TOKEN_LEN].copy_from_slice(&token.to_le_bytes());
    let body = &mut out[TOKEN_LEN..];

    match msg {
        Message::Registration { role } => body[0] = *role as u8,
        Message::RegistrationAck | Message::Heartbeat => {}
        Message::SensorReport(m) => {
            body[0..2].copy_from_slice(&m.temperature.to_le_bytes());
            body[2..4].copy_from_slice(&m.humidity.to_le_bytes());
            body[4..6].copy_from_slice(&m.light.to_le_bytes());
            body[6..8].copy_from_slice(&m.battery_mv.to_le_bytes());
        }
        Message::ActuatorCommand(c) => {
            body[0] = u8::from(c.open_window);
            body[1] = u8::from(c.open_irrigation);
            body[2] = u8::from(c.darken);
        }
        Message::ActuatorStatus(s) => body[0] = *s as u8,
    }
    Ok(len)
}

/// Encode `msg` into a fresh [`Frame`].
pub fn encode(token: Token, msg: &Message) -> Result<Frame, ProtocolError> {
    let mut buf = [0u8; MAX_FRAME_LEN];
    let len = encode_into(token, msg, &mut buf)?;
    Frame::from_slice(&buf[..len]).map_err(|()| ProtocolError::BufferTooSmall)
}
