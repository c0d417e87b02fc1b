//! Time adapters.
//!
//! Nodes never read a clock themselves: the host loop passes "seconds since
//! boot" into [`NodeTask::step`](crate::app::runtime::NodeTask::step).
//!
//! - [`SimClock`] is advanced by hand, so a simulation (or a test) runs
//!   as fast as the host can go and is fully repeatable.
//! - [`HostClock`] reads `std::time::Instant` for wall-clock runs.

use std::time::Instant;

/// Manually advanced clock, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    secs: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(secs: u64) -> Self {
        Self { secs }
    }

    /// Seconds since boot.
    pub fn uptime_secs(&self) -> u64 {
        self.secs
    }

    /// Move time forward and return the new uptime.
    pub fn advance(&mut self, secs: u64) -> u64 {
        self.secs = self.secs.saturating_add(secs);
        self.secs
    }
}

/// Monotonic wall clock.
pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since boot (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}
