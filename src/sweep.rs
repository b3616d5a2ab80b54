//! Deadline bookkeeping for the release-triggered eviction sweep

use std::time::{Duration, Instant};

/// Fixed-cadence sweep schedule.
///
/// Deadlines advance by exactly one period per fired sweep and stay
/// anchored to the construction instant. After a long stretch without
/// releases, each of the next releases fires one sweep until the missed
/// deadlines are used up.
#[derive(Debug)]
pub(crate) struct SweepSchedule {
    next_at: Instant,
    period: Duration,
}

impl SweepSchedule {
    /// The first deadline is the construction instant itself, so the
    /// first release always performs a sweep.
    pub fn new(period: Duration) -> Self {
        Self::anchored(Instant::now(), period)
    }

    pub fn anchored(start: Instant, period: Duration) -> Self {
        Self {
            next_at: start,
            period,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_at
    }

    /// Entries released strictly before this instant are eligible for
    /// eviction. `None` when the clock has not yet run for a full period,
    /// in which case nothing can be old enough.
    pub fn cutoff(&self, now: Instant) -> Option<Instant> {
        now.checked_sub(self.period)
    }

    /// Move the deadline one period forward.
    pub fn advance(&mut self) {
        self.next_at += self.period;
    }

    pub fn next_at(&self) -> Instant {
        self.next_at
    }
}
