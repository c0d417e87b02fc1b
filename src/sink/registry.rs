//! Bounded table of registered sensor nodes.
//!
//! The table is small, so lookups are a linear scan. Eviction swaps the
//! last entry into the freed slot and then shrinks, so no entry is ever
//! lost or duplicated.

use heapless::Vec;

use crate::error::RegistryError;
use crate::protocol::LinkAddr;

/// Compile-time ceiling on the registry size.
pub const MAX_SENSOR_NODES: usize = 8;

/// A node the sink has accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredNode {
    pub address: LinkAddr,
    /// Sink uptime when this node was last heard from.
    pub last_seen_secs: u64,
}

/// Result of a successful [`NodeRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Sensor node table. No two entries share an address.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    nodes: Vec<RegisteredNode, MAX_SENSOR_NODES>,
    capacity: usize,
}

impl NodeRegistry {
    /// `capacity` is clamped to [`MAX_SENSOR_NODES`].
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            capacity: capacity.min(MAX_SENSOR_NODES),
        }
    }

    /// Register `address`. Re-registering a known address changes nothing.
    pub fn add(&mut self, address: LinkAddr, now: u64) -> Result<AddOutcome, RegistryError> {
        if self.find(address).is_some() {
            return Ok(AddOutcome::AlreadyPresent);
        }
        if self.nodes.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded);
        }
        self.nodes
            .push(RegisteredNode {
                address,
                last_seen_secs: now,
            })
            .map_err(|_| RegistryError::CapacityExceeded)?;
        Ok(AddOutcome::Added)
    }

    /// Index of `address`, if registered.
    pub fn find(&self, address: LinkAddr) -> Option<usize> {
        self.nodes.iter().position(|n| n.address == address)
    }

    pub fn get(&self, address: LinkAddr) -> Option<&RegisteredNode> {
        self.nodes.iter().find(|n| n.address == address)
    }

    pub fn contains(&self, address: LinkAddr) -> bool {
        self.find(address).is_some()
    }

    /// Refresh `address`'s last-seen time. Returns `false` if unknown.
    pub fn touch(&mut self, address: LinkAddr, now: u64) -> bool {
        match self.nodes.iter_mut().find(|n| n.address == address) {
            Some(node) => {
                node.last_seen_secs = now;
                true
            }
            None => false,
        }
    }

    /// Remove `address`, returning the removed entry.
    pub fn evict(&mut self, address: LinkAddr) -> Option<RegisteredNode> {
        let index = self.find(address)?;
        Some(self.nodes.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredNode> {
        self.nodes.iter()
    }
}

/// The one actuator the sink knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorLink {
    pub address: LinkAddr,
    pub last_seen_secs: u64,
}
