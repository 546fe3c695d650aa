//! Single-slot cancelable timer. Scheduling replaces whatever was pending; handles are never
//! reused, so a handle from a replaced or cancelled schedule can no longer fire.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    issued: u64,
    pending: Option<(TimerHandle, Instant)>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot to fire `after` from `now`, invalidating any earlier handle.
    pub fn schedule(&mut self, now: Instant, after: Duration) -> TimerHandle {
        self.issued += 1;
        let handle = TimerHandle(self.issued);
        self.pending = Some((handle, now + after));
        handle
    }

    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.pending.take().map(|(h, _)| h)
    }

    #[inline]
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.pending.is_some_and(|(h, _)| h == handle)
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Time left before firing, zero once due.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline().map(|at| at.saturating_duration_since(now))
    }

    /// The pending handle if its deadline has been reached. Does not disarm.
    pub fn due(&self, now: Instant) -> Option<TimerHandle> {
        self.pending.and_then(|(h, at)| (now >= at).then_some(h))
    }

    /// Disarm if `handle` is the live one. Stale handles return false and change nothing.
    pub fn consume(&mut self, handle: TimerHandle) -> bool {
        if self.is_live(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
