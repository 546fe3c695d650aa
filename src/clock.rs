//! Fall tick source.

use std::time::{Duration, Instant};

/// Fires a tick whenever more than `interval` has passed since the last one.
/// The first poll after construction or `reset` only records the baseline.
#[derive(Debug, Clone)]
pub struct GameClock {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl GameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    /// True if a fall tick is due at `now`. While `suspended` nothing fires and the baseline
    /// follows `now`, so a full interval elapses after resuming.
    pub fn poll(&mut self, now: Instant, suspended: bool) -> bool {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return false;
        };
        if suspended {
            self.last_tick = Some(now);
            return false;
        }
        if now.saturating_duration_since(last) > self.interval {
            self.last_tick = Some(now);
            true
        } else {
            false
        }
    }
}
