//! State of one actuator channel.
//!
//! `broken` is an overlay on top of the logical on/off state. While a
//! channel is broken it is physically off, and `pending_on` remembers what
//! the sink last asked for so a repair can resume it.

/// Per-channel record owned by the actuator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// What the sink last asked for.
    pub requested_on: bool,
    /// Whether the channel is actually running.
    pub physically_on: bool,
    pub broken: bool,
    /// Desired state to restore on repair. Only meaningful while broken.
    pub pending_on: bool,
}

/// Effect of a command on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Unchanged,
    /// Physical state now equals the carried value.
    Switched(bool),
    /// Broken; the request was stored in `pending_on`.
    Deferred(bool),
}

impl ChannelState {
    /// Apply the sink's request for this channel.
    pub fn apply(&mut self, on: bool) -> ApplyOutcome {
        if self.broken {
            self.requested_on = on;
            self.pending_on = on;
            return ApplyOutcome::Deferred(on);
        }
        if self.requested_on == on {
            return ApplyOutcome::Unchanged;
        }
        self.requested_on = on;
        self.physically_on = on;
        ApplyOutcome::Switched(on)
    }

    /// Break the channel. Returns whether it was running. No-op (returning
    /// `None`) if already broken.
    pub fn break_down(&mut self) -> Option<bool> {
        if self.broken {
            return None;
        }
        let was_on = self.physically_on;
        self.broken = true;
        self.physically_on = false;
        self.pending_on = was_on;
        Some(was_on)
    }

    /// Repair the channel. Returns whether it resumed running, or `None`
    /// if it was not broken.
    pub fn repair(&mut self) -> Option<bool> {
        if !self.broken {
            return None;
        }
        let resumed = self.pending_on;
        self.broken = false;
        self.physically_on = resumed;
        self.requested_on = resumed;
        self.pending_on = false;
        Some(resumed)
    }

    /// Checks the channel's internal invariants.
    pub fn is_consistent(&self) -> bool {
        if self.broken {
            !self.physically_on
        } else {
            self.physically_on == self.requested_on && !self.pending_on
        }
    }
}
