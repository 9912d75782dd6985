//! Time sources for the simulation loop.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Block (or advance virtual time) for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`].
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock advanced by its owner.
///
/// Clones share the same time, so a test (or a host event loop) can keep a
/// handle and move time forward while the simulation loop owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Jump to `now`. Earlier times are ignored; the clock never runs backwards.
    pub fn set(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }
}

impl ManualClock {
    /// Jump to a host timestamp in milliseconds.
    ///
    /// Returns `false` and leaves the clock alone when `now_ms` is not a
    /// finite, non-negative number of milliseconds.
    pub fn set_millis(&self, now_ms: f64) -> bool {
        if !now_ms.is_finite() || now_ms < 0.0 {
            return false;
        }
        match Duration::try_from_secs_f64(now_ms / 1000.0) {
            Ok(now) => {
                self.set(now);
                true
            }
            Err(_) => false,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_millis(25));
        assert_eq!(clock.now(), Duration::from_millis(25));
        clock.sleep(Duration::from_millis(5));
        assert_eq!(handle.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_manual_clock_monotonic() {
        let clock = ManualClock::new();
        clock.set(Duration::from_millis(100));
        clock.set(Duration::from_millis(40));
        assert_eq!(clock.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_manual_clock_host_timestamps() {
        let clock = ManualClock::new();
        assert!(clock.set_millis(1500.0));
        assert_eq!(clock.now(), Duration::from_millis(1500));

        assert!(!clock.set_millis(f64::INFINITY));
        assert!(!clock.set_millis(f64::NAN));
        assert!(!clock.set_millis(-5.0));
        assert!(!clock.set_millis(f64::MAX));
        assert_eq!(clock.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now() > before);
    }
}
