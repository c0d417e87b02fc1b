//! Per-node event queue.
//!
//! Events are produced by:
//! - the radio adapter (an inbound frame addressed to this node or broadcast)
//! - the scheduler (a one-shot or periodic timer expired)
//! - local inputs (buttons, the settings console)
//!
//! Events are consumed by the node's task, which handles them one at a
//! time in FIFO order. Nothing else ever touches the node's state.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Radio       │────▶│              │     │              │
//! │ Scheduler   │────▶│  EventQueue  │────▶│  Node task   │
//! │ Local input │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::Deque;

use crate::app::commands::AppCommand;
use crate::protocol::{Frame, LinkAddr};

/// Maximum number of pending events per node.
pub const EVENT_QUEUE_CAP: usize = 32;

/// A frame as handed up by the link layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub src: LinkAddr,
    pub dest: LinkAddr,
    pub payload: Frame,
}

impl Inbound {
    pub fn is_broadcast(&self) -> bool {
        self.dest.is_broadcast()
    }
}

/// Everything that can wake a node task. `K` is the node's timer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<K> {
    /// A frame arrived.
    Frame(Inbound),
    /// A timer armed by this node expired.
    Timer(K),
    /// A local input (button press, console command).
    Input(AppCommand),
}

/// Bounded FIFO of pending events, owned by one node.
pub struct EventQueue<K> {
    pending: Deque<Event<K>, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl<K> Default for EventQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EventQueue<K> {
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            dropped: 0,
        }
    }

    /// Push an event into the queue.
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&mut self, event: Event<K>) -> bool {
        if self.pending.push_back(event).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        true
    }

    /// Pop the next event. Returns `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<Event<K>> {
        self.pending.pop_front()
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&mut self, mut handler: impl FnMut(Event<K>)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Events lost to a full queue since creation.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
