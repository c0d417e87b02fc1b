//! Command application, break and repair across the three channels.

use heapless::Vec;
use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::app::ports::Indicators;
use crate::protocol::message::Channel;
use crate::protocol::{ActuatorCommand, FaultStatus};

use super::channel::{ApplyOutcome, ChannelState};
use super::indicator::aggregate;

/// How one channel reacted to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelChange {
    pub channel: Channel,
    pub outcome: ApplyOutcome,
}

/// A channel that just broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakage {
    pub channel: Channel,
    pub was_on: bool,
}

impl Breakage {
    pub fn status(&self) -> FaultStatus {
        FaultStatus::broken(self.channel)
    }
}

/// A channel that was just repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repair {
    pub channel: Channel,
    pub resumed: bool,
}

impl Repair {
    pub fn status(&self) -> FaultStatus {
        FaultStatus::ok(self.channel)
    }
}

/// The actuator's three channels.
#[derive(Debug, Clone, Default)]
pub struct ActuatorStateMachine {
    channels: [ChannelState; Channel::COUNT],
}

impl ActuatorStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: Channel) -> &ChannelState {
        &self.channels[channel.index()]
    }

    pub fn channels(&self) -> &[ChannelState; Channel::COUNT] {
        &self.channels
    }

    /// Current LED state.
    pub fn indicators(&self) -> Indicators {
        aggregate(&self.channels)
    }

    /// Apply a command to every channel. Unchanged channels are omitted.
    pub fn apply_command(
        &mut self,
        command: &ActuatorCommand,
    ) -> Vec<ChannelChange, { Channel::COUNT }> {
        let mut changes = Vec::new();
        for channel in Channel::ALL {
            let outcome = self.channels[channel.index()].apply(command.get(channel));
            match outcome {
                ApplyOutcome::Unchanged => continue,
                ApplyOutcome::Switched(on) => {
                    info!("Actuator: {} {}", channel.name(), if on { "on" } else { "off" });
                }
                ApplyOutcome::Deferred(on) => {
                    warn!(
                        "Actuator: {} requested {} but it is broken",
                        channel.name(),
                        if on { "on" } else { "off" }
                    );
                }
            }
            let _ = changes.push(ChannelChange { channel, outcome });
        }
        changes
    }

    /// Channels a break could hit.
    pub fn eligible_for_break(&self) -> Vec<Channel, { Channel::COUNT }> {
        Channel::ALL
            .into_iter()
            .filter(|ch| !self.channels[ch.index()].broken)
            .collect()
    }

    /// Break `channel`. `None` if it is already broken.
    pub fn break_channel(&mut self, channel: Channel) -> Option<Breakage> {
        let was_on = self.channels[channel.index()].break_down()?;
        warn!("Actuator: {} broken", channel.name());
        Some(Breakage { channel, was_on })
    }

    /// Break one working channel, chosen uniformly. `None` if every channel
    /// is already broken.
    pub fn break_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Breakage> {
        let eligible = self.eligible_for_break();
        let channel = *eligible.as_slice().choose(rng)?;
        self.break_channel(channel)
    }

    /// Repair the first broken channel in [`Channel::ALL`] order.
    pub fn repair_next(&mut self) -> Option<Repair> {
        let channel = Channel::ALL
            .into_iter()
            .find(|ch| self.channels[ch.index()].broken)?;
        let resumed = self.channels[channel.index()].repair()?;
        info!(
            "Actuator: {} repaired{}",
            channel.name(),
            if resumed { ", resuming" } else { "" }
        );
        Some(Repair { channel, resumed })
    }

    pub fn all_broken(&self) -> bool {
        self.channels.iter().all(|c| c.broken)
    }
}
