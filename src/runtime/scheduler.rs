//! Interval tick scheduling against an external clock.

use std::time::Duration;

use crate::schema::LateTicks;

/// Deadline bookkeeping for interval ticks.
///
/// The scheduler never calls anything itself; the owner asks how many ticks
/// are due at a given time and fires them one after another.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    next_deadline: Option<Duration>,
    late_ticks: LateTicks,
    dropped: u64,
}

impl TickScheduler {
    pub fn new(interval: Duration, late_ticks: LateTicks) -> Self {
        Self {
            interval,
            next_deadline: None,
            late_ticks,
            dropped: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a tick is pending.
    pub fn is_armed(&self) -> bool {
        self.next_deadline.is_some()
    }

    /// Schedule the first tick one interval after `now`.
    pub fn arm(&mut self, now: Duration) {
        self.next_deadline = Some(now + self.interval);
    }

    /// Drop any pending tick.
    pub fn cancel(&mut self) {
        self.next_deadline = None;
    }

    /// Change the interval. A pending tick is rescheduled from `now`.
    pub fn set_interval(&mut self, interval: Duration, now: Duration) {
        self.interval = interval;
        if self.is_armed() {
            self.arm(now);
        }
    }

    /// Time left until the pending tick (zero if overdue).
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.next_deadline.map(|d| d.saturating_sub(now))
    }

    /// Number of ticks to fire at `now`, advancing the deadline past `now`.
    ///
    /// Deadlines keep their phase: after a late poll the next deadline is
    /// still a whole number of intervals after the first one.
    pub fn take_due(&mut self, now: Duration) -> u32 {
        let Some(deadline) = self.next_deadline else {
            return 0;
        };
        if now < deadline {
            return 0;
        }

        let interval_ns = self.interval.as_nanos().max(1);
        let due = 1 + (now - deadline).as_nanos() / interval_ns;
        let next_ns = deadline.as_nanos() + interval_ns * due;
        self.next_deadline = Some(Duration::from_nanos(
            u64::try_from(next_ns).unwrap_or(u64::MAX),
        ));

        let fire = match self.late_ticks {
            LateTicks::Coalesce => 1,
            LateTicks::CatchUp { max_ticks } => due.min(u128::from(max_ticks)),
        };
        let dropped = due - fire;
        if dropped > 0 {
            self.dropped += u64::try_from(dropped).unwrap_or(u64::MAX);
            log::debug!("Dropped {dropped} late tick(s)");
        }
        fire as u32
    }

    /// Total ticks dropped by the late-tick policy.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped
    }
}
