//! Periodic staleness sweep.
//!
//! A node is stale once `now - last_seen` strictly exceeds its timeout.
//! Stale sensor nodes are removed through [`NodeRegistry::evict`]; a stale
//! actuator is forgotten. Nothing else is touched: commands already sent
//! stay sent, and the actuator's channels are its own business.

use heapless::Vec;

use crate::protocol::LinkAddr;

use super::registry::{ActuatorLink, MAX_SENSOR_NODES, NodeRegistry};

/// A node removed by a sweep and how long it had been silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silent {
    pub address: LinkAddr,
    pub silent_secs: u64,
}

/// What one sweep removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: Vec<Silent, MAX_SENSOR_NODES>,
    pub actuator_lost: Option<Silent>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty() && self.actuator_lost.is_none()
    }
}

/// Timeout checks for sensor nodes and the actuator.
#[derive(Debug, Clone, Copy)]
pub struct LivenessMonitor {
    sensor_timeout_secs: u64,
    actuator_timeout_secs: u64,
}

impl LivenessMonitor {
    pub fn new(sensor_timeout_secs: u64, actuator_timeout_secs: u64) -> Self {
        Self {
            sensor_timeout_secs,
            actuator_timeout_secs,
        }
    }

    /// Remove every node silent for longer than its timeout.
    pub fn sweep(
        &self,
        now: u64,
        registry: &mut NodeRegistry,
        actuator: &mut Option<ActuatorLink>,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        let stale: Vec<Silent, MAX_SENSOR_NODES> = registry
            .iter()
            .filter(|n| is_stale(now, n.last_seen_secs, self.sensor_timeout_secs))
            .map(|n| Silent {
                address: n.address,
                silent_secs: now.saturating_sub(n.last_seen_secs),
            })
            .collect();

        for silent in stale {
            if registry.evict(silent.address).is_some() {
                // Bounded by the registry's own capacity.
                let _ = report.evicted.push(silent);
            }
        }

        if let Some(link) = *actuator {
            if is_stale(now, link.last_seen_secs, self.actuator_timeout_secs) {
                *actuator = None;
                report.actuator_lost = Some(Silent {
                    address: link.address,
                    silent_secs: now.saturating_sub(link.last_seen_secs),
                });
            }
        }

        report
    }
}

fn is_stale(now: u64, last_seen: u64, timeout: u64) -> bool {
    now.saturating_sub(last_seen) > timeout
}
