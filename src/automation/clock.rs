//! Time source for the scheduler.

use std::time::{Duration, Instant};

/// Reads time and sleeps. The scheduler never touches `std::thread::sleep`
/// directly, so tests can run it on a manual clock.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time with blocking sleeps.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
