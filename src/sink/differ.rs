//! Redundant-send suppression.
//!
//! The differ holds the sink's single authoritative "last sent" command.
//! It is overwritten before the frame goes out, so a lost send is never
//! retried by the sink itself; the next differing decision carries the
//! correction.

use crate::protocol::{ActuatorCommand, LinkAddr};

/// What the sink should do with a candidate command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Same as last sent; nothing to do.
    Unchanged,
    /// Differs, but no actuator is registered. Not recorded as sent.
    Held(ActuatorCommand),
    /// Differs; recorded as sent, transmit now.
    Send {
        to: LinkAddr,
        command: ActuatorCommand,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CommandDiffer {
    last_sent: ActuatorCommand,
}

impl CommandDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_sent(&self) -> ActuatorCommand {
        self.last_sent
    }

    pub fn apply(&mut self, candidate: ActuatorCommand, actuator: Option<LinkAddr>) -> DiffOutcome {
        if candidate == self.last_sent {
            return DiffOutcome::Unchanged;
        }
        match actuator {
            None => DiffOutcome::Held(candidate),
            Some(to) => {
                self.last_sent = candidate;
                DiffOutcome::Send {
                    to,
                    command: candidate,
                }
            }
        }
    }
}
