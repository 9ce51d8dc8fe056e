//! Countdown engine
//!
//! One countdown per reminder slot, ticking once per second on the board
//! clock. The engine never looks at slot configuration or labels; it only
//! reports what happened and lets the board decide what that means.

use crate::reminders::SlotId;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Countdown resolution
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle of one running countdown
///
/// Monotonically increasing per engine, so comparing handles gives start order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// What a due countdown reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; `remaining` seconds left
    Tick { slot: SlotId, remaining: u32 },

    /// Countdown reached zero; the handle no longer exists
    Expired { slot: SlotId },
}

impl TimerEvent {
    pub fn slot(&self) -> SlotId {
        match self {
            TimerEvent::Tick { slot, .. } | TimerEvent::Expired { slot } => *slot,
        }
    }
}

#[derive(Debug, Clone)]
struct Countdown {
    handle: TimerHandle,
    total_seconds: u32,
    remaining: u32,
    next_tick_at: Duration,
}

/// Per-slot countdowns on a shared clock
#[derive(Debug)]
pub struct TimerEngine {
    countdowns: HashMap<SlotId, Countdown>,
    next_handle: u64,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            countdowns: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Start a countdown of `total_seconds` for `slot`.
    ///
    /// An existing countdown for the slot is cancelled first. The first tick
    /// is due one second after `now`.
    pub fn start(&mut self, slot: SlotId, total_seconds: u32, now: Duration) -> TimerHandle {
        if let Some(old) = self.countdowns.remove(&slot) {
            debug!("Replacing {} for slot {}", old.handle, slot);
        }

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        let total_seconds = total_seconds.max(1);
        self.countdowns.insert(
            slot,
            Countdown {
                handle,
                total_seconds,
                remaining: total_seconds,
                next_tick_at: now + TICK_INTERVAL,
            },
        );
        debug!("Started {} for slot {} ({}s)", handle, slot, total_seconds);
        handle
    }

    /// Cancel the countdown for `slot`; returns whether one was running
    pub fn stop(&mut self, slot: SlotId) -> bool {
        match self.countdowns.remove(&slot) {
            Some(countdown) => {
                debug!("Stopped {} for slot {}", countdown.handle, slot);
                true
            }
            None => false,
        }
    }

    /// Process every tick due at or before `now`.
    ///
    /// Events come out ordered by due time, then by handle. A countdown that
    /// is several ticks behind reports each of them.
    pub fn fire_due(&mut self, now: Duration) -> Vec<TimerEvent> {
        let mut due: Vec<(Duration, TimerHandle, SlotId)> = Vec::new();
        for (slot, countdown) in &self.countdowns {
            let mut at = countdown.next_tick_at;
            let mut remaining = countdown.remaining;
            while at <= now && remaining > 0 {
                due.push((at, countdown.handle, *slot));
                remaining -= 1;
                at += TICK_INTERVAL;
            }
        }
        due.sort_by_key(|(at, handle, _)| (*at, *handle));

        let mut events = Vec::with_capacity(due.len());
        for (_, _, slot) in due {
            let Some(countdown) = self.countdowns.get_mut(&slot) else {
                continue;
            };
            countdown.remaining -= 1;
            countdown.next_tick_at += TICK_INTERVAL;
            events.push(TimerEvent::Tick {
                slot,
                remaining: countdown.remaining,
            });

            if countdown.remaining == 0 {
                debug!(
                    "{} for slot {} expired after {}s",
                    countdown.handle, slot, countdown.total_seconds
                );
                self.countdowns.remove(&slot);
                events.push(TimerEvent::Expired { slot });
            }
        }
        events
    }

    /// Earliest pending tick across all countdowns
    pub fn next_due(&self) -> Option<Duration> {
        self.countdowns.values().map(|c| c.next_tick_at).min()
    }

    /// Seconds left on the slot's countdown
    pub fn remaining(&self, slot: SlotId) -> Option<u32> {
        self.countdowns.get(&slot).map(|c| c.remaining)
    }

    pub fn handle(&self, slot: SlotId) -> Option<TimerHandle> {
        self.countdowns.get(&slot).map(|c| c.handle)
    }

    pub fn is_counting(&self, slot: SlotId) -> bool {
        self.countdowns.contains_key(&slot)
    }

    pub fn active_count(&self) -> usize {
        self.countdowns.len()
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}
