//! Unified error types for the greenhouse network.
//!
//! A single `Error` enum that every subsystem converts into, so node event
//! loops handle failures uniformly. All variants are `Copy`; none of them is
//! fatal to a node task. Each is filtered, logged, and the task goes back
//! to waiting for its next event.

use core::fmt;

use crate::protocol::MessageKind;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible domain operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An inbound frame failed validation.
    Protocol(ProtocolError),
    /// The sensor registry rejected an operation.
    Registry(RegistryError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Capability token did not match. Treated as an intruder.
    AuthFailure,
    /// Frame length does not match the size of the kind the receiver expected.
    Malformed {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },
    /// Registration carried a role tag outside the known set.
    UnknownRole(u8),
    /// Status report carried a fault tag outside the known set.
    UnknownFaultStatus(u8),
    /// Output buffer cannot hold the encoded message.
    BufferTooSmall,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthFailure => write!(f, "token mismatch (possible intruder)"),
            Self::Malformed {
                kind,
                expected,
                actual,
            } => write!(f, "malformed {kind:?}: expected {expected} bytes, got {actual}"),
            Self::UnknownRole(tag) => write!(f, "unknown role tag {tag}"),
            Self::UnknownFaultStatus(tag) => write!(f, "unknown fault status tag {tag}"),
            Self::BufferTooSmall => write!(f, "output buffer too small"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The table is full; the node was not stored.
    CapacityExceeded,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded => write!(f, "capacity exceeded"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
