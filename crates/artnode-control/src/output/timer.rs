//! Timing source for the output loops

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Remaining time below which [`PrecisionTimer`] spins instead of sleeping
const SPIN_THRESHOLD: Duration = Duration::from_millis(1);

/// Monotonic clock with blocking waits
pub trait Timer: Send {
    fn now(&self) -> Instant;

    /// Block until `deadline`; returns at once if it already passed
    fn sleep_until(&mut self, deadline: Instant);

    fn sleep(&mut self, duration: Duration) {
        let deadline = self.now() + duration;
        self.sleep_until(deadline);
    }
}

/// Wall-clock timer with microsecond-level accuracy
///
/// Sleeps on the OS scheduler for the bulk of the wait and busy-waits for the
/// last millisecond, which is what DMX break and mark timing needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecisionTimer;

impl Timer for PrecisionTimer {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            let remaining = deadline - now;
            if remaining > SPIN_THRESHOLD {
                thread::sleep(remaining - SPIN_THRESHOLD);
            } else {
                std::hint::spin_loop();
            }
        }
    }
}

/// Virtual clock that only moves when slept on
///
/// Clones share the same clock, so a recording sink can timestamp what it
/// sees while the driver under test advances time.
#[derive(Debug, Clone)]
pub struct ManualTimer {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualTimer {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward without a deadline
    pub fn advance(&self, duration: Duration) {
        *self.now.lock() += duration;
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let mut now = self.now.lock();
        if deadline > *now {
            *now = deadline;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_timer_jumps_to_deadline() {
        let mut timer = ManualTimer::new();
        let start = timer.now();
        timer.sleep(Duration::from_micros(176));
        assert_eq!(timer.now() - start, Duration::from_micros(176));
    }

    #[test]
    fn test_manual_timer_never_goes_back() {
        let mut timer = ManualTimer::new();
        let start = timer.now();
        timer.advance(Duration::from_millis(5));
        timer.sleep_until(start + Duration::from_millis(1));
        assert_eq!(timer.now() - start, Duration::from_millis(5));
    }

    #[test]
    fn test_manual_timer_clones_share_clock() {
        let mut timer = ManualTimer::new();
        let observer = timer.clone();
        timer.sleep(Duration::from_micros(54));
        assert_eq!(observer.now(), timer.now());
    }

    #[test]
    fn test_precision_timer_waits_at_least_deadline() {
        let mut timer = PrecisionTimer;
        let start = Instant::now();
        timer.sleep(Duration::from_micros(300));
        assert!(start.elapsed() >= Duration::from_micros(300));
    }
}
