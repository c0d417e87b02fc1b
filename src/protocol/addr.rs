//! Link-layer addressing.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Length of a link-layer address in bytes.
pub const LINK_ADDR_LEN: usize = 8;

/// An 8-byte link-layer address.
///
/// The all-zero address doubles as the broadcast sentinel: a frame whose
/// destination equals [`LinkAddr::BROADCAST`] was sent to everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LinkAddr(pub [u8; LINK_ADDR_LEN]);

impl LinkAddr {
    /// Broadcast / null sentinel.
    pub const BROADCAST: Self = Self([0; LINK_ADDR_LEN]);

    /// Build an address whose last two bytes carry `id` (big-endian).
    pub const fn from_id(id: u16) -> Self {
        let [hi, lo] = id.to_be_bytes();
        Self([0, 0, 0, 0, 0, 0, hi, lo])
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Display for LinkAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}", self.0[6], self.0[7])
    }
}
