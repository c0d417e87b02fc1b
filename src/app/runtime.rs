//! Single cooperative task per node.
//!
//! A [`NodeTask`] owns one node service together with its event queue and
//! its timers. Adapters feed it frames ([`NodeTask::deliver`]) and local
//! inputs ([`NodeTask::input`]); the host loop calls [`NodeTask::step`]
//! with the current time, which turns expired timers into queue events and
//! then hands every pending event to the node, one at a time.

use core::fmt::Debug;

use log::warn;

use crate::events::{Event, EventQueue, Inbound};
use crate::scheduler::Scheduler;

use super::commands::AppCommand;
use super::ports::{EventSink, RadioPort, SchedulerDelegate, TimerFiredKind};

/// Everything a node may touch while handling one event.
pub struct NodeCtx<'a, K> {
    /// Seconds since the node booted.
    pub now: u64,
    pub timers: &'a mut Scheduler<K>,
    pub radio: &'a mut dyn RadioPort,
    pub events: &'a mut dyn EventSink,
}

/// A node service driven by [`NodeTask`].
pub trait Node {
    /// The node's timer keys.
    type Timer: Copy + Eq + Debug;

    /// Called once before the first event.
    fn start(&mut self, cx: &mut NodeCtx<'_, Self::Timer>);

    /// Handle exactly one event. Must never block.
    fn handle(&mut self, event: Event<Self::Timer>, cx: &mut NodeCtx<'_, Self::Timer>);
}

/// Scheduler delegate that turns expired timers into queue events.
struct QueueDelegate<'a, K> {
    queue: &'a mut EventQueue<K>,
}

impl<K: Debug> SchedulerDelegate<K> for QueueDelegate<'_, K> {
    fn on_timer_fired(&mut self, key: K, _kind: TimerFiredKind) {
        if !self.queue.push(Event::Timer(key)) {
            warn!("Runtime: event queue full, timer tick lost");
        }
    }
}

/// One node, its queue and its timers.
pub struct NodeTask<N: Node> {
    node: N,
    queue: EventQueue<N::Timer>,
    timers: Scheduler<N::Timer>,
    started: bool,
}

impl<N: Node> NodeTask<N> {
    pub fn new(node: N) -> Self {
        Self {
            node,
            queue: EventQueue::new(),
            timers: Scheduler::new(),
            started: false,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut N {
        &mut self.node
    }

    pub fn timers(&self) -> &Scheduler<N::Timer> {
        &self.timers
    }

    /// Number of events waiting for the next [`step`](Self::step).
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Enqueue an inbound frame. Returns `false` if the queue is full.
    pub fn deliver(&mut self, frame: Inbound) -> bool {
        let ok = self.queue.push(Event::Frame(frame));
        if !ok {
            warn!("Runtime: event queue full, frame dropped");
        }
        ok
    }

    /// Enqueue a local input. Returns `false` if the queue is full.
    pub fn input(&mut self, command: AppCommand) -> bool {
        let ok = self.queue.push(Event::Input(command));
        if !ok {
            warn!("Runtime: event queue full, {:?} dropped", command);
        }
        ok
    }

    /// Start the node if needed, fire due timers, then handle every pending
    /// event. Returns the number of events handled.
    pub fn step(
        &mut self,
        now: u64,
        radio: &mut dyn RadioPort,
        events: &mut dyn EventSink,
    ) -> usize {
        if !self.started {
            self.started = true;
            let mut cx = NodeCtx {
                now,
                timers: &mut self.timers,
                radio: &mut *radio,
                events: &mut *events,
            };
            self.node.start(&mut cx);
        }

        self.timers.poll(
            now,
            &mut QueueDelegate {
                queue: &mut self.queue,
            },
        );

        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            let mut cx = NodeCtx {
                now,
                timers: &mut self.timers,
                radio: &mut *radio,
                events: &mut *events,
            };
            self.node.handle(event, &mut cx);
            handled += 1;
        }
        handled
    }
}
