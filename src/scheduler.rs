//! Timer service.
//!
//! Each node owns one [`Scheduler`] keyed by its own timer enum. The
//! scheduler never calls into node logic: when a timer expires it notifies
//! a [`SchedulerDelegate`], and the node runtime turns that notification
//! into an [`Event::Timer`](crate::events::Event::Timer) in the node's
//! queue. Periodic timers re-arm themselves, so a periodic tick is just a
//! deferred message that keeps coming back.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Scheduler<K>                                                │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐                 │
//! │  │ One-shot  │  │ Periodic  │  │ Periodic  │   ...           │
//! │  │ (retry)   │  │ (sweep)   │  │ (beat)    │                 │
//! │  └─────┬─────┘  └─────┬─────┘  └─────┬─────┘                 │
//! │        ▼              ▼              ▼                       │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate<K>                      │  │
//! │  │       (runtime pushes Event::Timer(K) into queue)      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use core::fmt::Debug;

use heapless::Vec;
use log::debug;

use crate::app::ports::{SchedulerDelegate, TimerFiredKind};

/// Maximum number of concurrently armed timers per node.
pub const MAX_TIMERS: usize = 8;

/// How a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fire once after `delay_secs`, then disarm.
    OneShot { delay_secs: u64 },
    /// Fire every `period_secs` until cancelled.
    Periodic { period_secs: u64 },
}

/// Internal bookkeeping for an armed timer.
#[derive(Debug, Clone, Copy)]
struct TimerEntry<K> {
    key: K,
    /// Absolute expiry time in seconds.
    deadline: u64,
    /// `Some` for periodic timers.
    period: Option<u64>,
}

/// The per-node timer engine.
pub struct Scheduler<K> {
    timers: Vec<TimerEntry<K>, MAX_TIMERS>,
}

impl<K: Copy + Eq + Debug> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self { timers: Vec::new() }
    }

    /// Arm `key`, replacing any timer already armed under the same key
    /// (restart semantics). Returns `false` if every slot is taken.
    pub fn arm(&mut self, key: K, kind: TimerKind, now: u64) -> bool {
        let (delay, period) = match kind {
            TimerKind::OneShot { delay_secs } => (delay_secs, None),
            TimerKind::Periodic { period_secs } => {
                let p = period_secs.max(1);
                (p, Some(p))
            }
        };
        let entry = TimerEntry {
            key,
            deadline: now.saturating_add(delay),
            period,
        };

        if let Some(slot) = self.timers.iter_mut().find(|t| t.key == key) {
            *slot = entry;
            return true;
        }
        if self.timers.push(entry).is_err() {
            debug!("Scheduler: no free slot for {:?}", key);
            return false;
        }
        true
    }

    /// Disarm `key`. Returns whether it was armed.
    pub fn cancel(&mut self, key: K) -> bool {
        match self.timers.iter().position(|t| t.key == key) {
            Some(i) => {
                self.timers.swap_remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self, key: K) -> bool {
        self.timers.iter().any(|t| t.key == key)
    }

    /// Absolute expiry time of `key`, if armed.
    pub fn deadline(&self, key: K) -> Option<u64> {
        self.timers.iter().find(|t| t.key == key).map(|t| t.deadline)
    }

    /// Earliest expiry across all armed timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Number of armed timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Fire every timer whose deadline has passed.
    ///
    /// A periodic timer fires at most once per poll; if the caller fell
    /// behind by several periods the missed ones are skipped.
    pub fn poll(&mut self, now: u64, delegate: &mut dyn SchedulerDelegate<K>) {
        let mut i = 0;
        while i < self.timers.len() {
            let entry = &mut self.timers[i];
            if entry.deadline > now {
                i += 1;
                continue;
            }

            let key = entry.key;
            match entry.period {
                Some(period) => {
                    let mut next = entry.deadline.saturating_add(period);
                    while next <= now {
                        next = next.saturating_add(period);
                    }
                    entry.deadline = next;
                    i += 1;
                    delegate.on_timer_fired(key, TimerFiredKind::Periodic);
                }
                None => {
                    self.timers.swap_remove(i);
                    delegate.on_timer_fired(key, TimerFiredKind::OneShot);
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
