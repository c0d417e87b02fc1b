//! Join handshake shared by the actuator and the sensor nodes.
//!
//! ```text
//!               connect()                ack from sink
//! Disconnected ──────────▶ Joining{n} ─────────────────▶ Joined{sink}
//!      ▲                       │ retry timer, n <= retries: broadcast again
//!      └───────────────────────┘ retry timer, n > retries: JoinFailed
//! ```
//!
//! The joiner only tracks the link state and talks to the radio. Arming
//! the retry timer is left to the owning service, which is told whether
//! to do so by the return value of [`Joiner::connect`] and
//! [`Joiner::on_retry`].

use log::{debug, info, warn};

use crate::config::JoinConfig;
use crate::protocol::codec::decode;
use crate::protocol::{LinkAddr, Message, MessageKind, Role, Token};

use super::events::{AppEvent, DropReason};
use super::ports::{EventSink, RadioPort};

/// Where a leaf node stands with respect to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    /// `attempts` registrations broadcast so far.
    Joining { attempts: u8 },
    Joined { sink: LinkAddr },
}

/// Bounded-retry registration against the sink.
pub struct Joiner {
    role: Role,
    token: Token,
    config: JoinConfig,
    state: LinkState,
}

impl Joiner {
    pub fn new(role: Role, token: Token, config: JoinConfig) -> Self {
        Self {
            role,
            token,
            config,
            state: LinkState::Disconnected,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Delay the owner should arm its retry timer with.
    pub fn retry_secs(&self) -> u64 {
        self.config.retry_secs
    }

    pub fn sink(&self) -> Option<LinkAddr> {
        match self.state {
            LinkState::Joined { sink } => Some(sink),
            _ => None,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.state, LinkState::Joined { .. })
    }

    /// Start joining. Only valid while disconnected; returns `true` if the
    /// caller should arm the retry timer.
    pub fn connect(&mut self, radio: &mut dyn RadioPort, events: &mut dyn EventSink) -> bool {
        if self.state != LinkState::Disconnected {
            debug!("Join: connect ignored in {:?}", self.state);
            return false;
        }
        self.attempt(1, radio, events);
        true
    }

    /// The retry timer fired. Returns `true` if it should be armed again.
    pub fn on_retry(&mut self, radio: &mut dyn RadioPort, events: &mut dyn EventSink) -> bool {
        let LinkState::Joining { attempts } = self.state else {
            return false;
        };
        if attempts > self.config.max_retries {
            warn!("Join: no answer after {} broadcasts", attempts);
            self.state = LinkState::Disconnected;
            events.emit(&AppEvent::JoinFailed);
            return false;
        }
        self.attempt(attempts + 1, radio, events);
        true
    }

    /// Try to read a unicast `payload` from `src` as the registration ack.
    pub fn accept_ack(
        &mut self,
        src: LinkAddr,
        payload: &[u8],
        events: &mut dyn EventSink,
    ) -> Result<LinkAddr, DropReason> {
        if !matches!(self.state, LinkState::Joining { .. }) {
            return Err(DropReason::Unexpected);
        }
        decode(MessageKind::RegistrationAck, self.token, payload)?;

        info!("Join: registered with sink {}", src);
        self.state = LinkState::Joined { sink: src };
        events.emit(&AppEvent::Joined { sink: src });
        Ok(src)
    }

    /// Leave the network. The sink notices through its liveness timeout.
    pub fn disconnect(&mut self, events: &mut dyn EventSink) {
        if self.state == LinkState::Disconnected {
            return;
        }
        self.state = LinkState::Disconnected;
        events.emit(&AppEvent::Disconnected);
    }

    fn attempt(&mut self, attempt: u8, radio: &mut dyn RadioPort, events: &mut dyn EventSink) {
        self.state = LinkState::Joining { attempts: attempt };
        radio.send_message(
            self.token,
            LinkAddr::BROADCAST,
            &Message::Registration { role: self.role },
        );
        events.emit(&AppEvent::Joining {
            attempt,
            max_attempts: self.config.max_retries.saturating_add(1),
        });
    }
}
