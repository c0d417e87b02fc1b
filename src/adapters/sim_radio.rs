//! Simulated radio medium.
//!
//! Every attached node gets a bounded mailbox (an `embassy-sync`
//! [`Channel`]). A unicast lands in the destination's mailbox; a broadcast
//! lands in every mailbox except the sender's. Delivery is fire-and-forget:
//! a full mailbox, an unknown destination or simulated loss drops the
//! frame without telling the sender.
//!
//! ```text
//!  SimRadio(a) ──send──▶ SimMedium ──▶ mailbox(b) ──receive──▶ NodeTask(b)
//!                                 └──▶ mailbox(c)      (broadcast)
//! ```

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::RadioPort;
use crate::events::Inbound;
use crate::protocol::{Frame, LinkAddr};

/// Frames a node can have waiting before the medium starts dropping.
pub const MAILBOX_DEPTH: usize = 16;

struct Mailbox {
    addr: LinkAddr,
    queue: Channel<NoopRawMutex, Inbound, MAILBOX_DEPTH>,
}

struct LossModel {
    rng: StdRng,
    probability: f64,
}

/// Delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediumStats {
    pub delivered: u32,
    pub lost: u32,
    pub overflowed: u32,
    pub unroutable: u32,
}

/// Shared air between simulated nodes. Single-threaded.
#[derive(Default)]
pub struct SimMedium {
    mailboxes: Vec<Mailbox>,
    loss: RefCell<Option<LossModel>>,
    stats: Cell<MediumStats>,
}

impl SimMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop each delivery independently with `probability`.
    pub fn with_loss(probability: f64, seed: u64) -> Self {
        Self {
            loss: RefCell::new(Some(LossModel {
                rng: StdRng::seed_from_u64(seed),
                probability: probability.clamp(0.0, 1.0),
            })),
            ..Self::default()
        }
    }

    /// Give `addr` a mailbox. Returns `false` for the broadcast address or
    /// an address already attached.
    pub fn attach(&mut self, addr: LinkAddr) -> bool {
        if addr.is_broadcast() || self.mailboxes.iter().any(|m| m.addr == addr) {
            return false;
        }
        self.mailboxes.push(Mailbox {
            addr,
            queue: Channel::new(),
        });
        true
    }

    /// A radio handle for the node at `addr`.
    pub fn radio(&self, addr: LinkAddr) -> SimRadio<'_> {
        SimRadio { medium: self, addr }
    }

    /// Next frame waiting for `addr`.
    pub fn receive(&self, addr: LinkAddr) -> Option<Inbound> {
        self.mailbox(addr)?.queue.try_receive().ok()
    }

    pub fn stats(&self) -> MediumStats {
        self.stats.get()
    }

    fn mailbox(&self, addr: LinkAddr) -> Option<&Mailbox> {
        self.mailboxes.iter().find(|m| m.addr == addr)
    }

    fn transmit(&self, src: LinkAddr, dest: LinkAddr, frame: &[u8]) {
        let Ok(payload) = Frame::from_slice(frame) else {
            warn!("Medium: {} byte frame from {} too long", frame.len(), src);
            return;
        };

        if dest.is_broadcast() {
            for mailbox in self.mailboxes.iter().filter(|m| m.addr != src) {
                self.deliver(mailbox, src, dest, payload.clone());
            }
        } else if let Some(mailbox) = self.mailbox(dest) {
            self.deliver(mailbox, src, dest, payload);
        } else {
            debug!("Medium: nobody at {}", dest);
            self.bump(|s| s.unroutable += 1);
        }
    }

    fn deliver(&self, mailbox: &Mailbox, src: LinkAddr, dest: LinkAddr, payload: Frame) {
        if self.roll_loss() {
            self.bump(|s| s.lost += 1);
            return;
        }
        match mailbox.queue.try_send(Inbound { src, dest, payload }) {
            Ok(()) => self.bump(|s| s.delivered += 1),
            Err(_) => {
                debug!("Medium: mailbox of {} full", mailbox.addr);
                self.bump(|s| s.overflowed += 1);
            }
        }
    }

    fn roll_loss(&self) -> bool {
        match self.loss.borrow_mut().as_mut() {
            Some(model) => model.rng.gen_bool(model.probability),
            None => false,
        }
    }

    fn bump(&self, f: impl FnOnce(&mut MediumStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

/// [`RadioPort`] for one node attached to a [`SimMedium`].
pub struct SimRadio<'a> {
    medium: &'a SimMedium,
    addr: LinkAddr,
}

impl RadioPort for SimRadio<'_> {
    fn local_addr(&self) -> LinkAddr {
        self.addr
    }

    fn send(&mut self, dest: LinkAddr, frame: &[u8]) {
        self.medium.transmit(self.addr, dest, frame);
    }
}
