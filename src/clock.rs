//! Monotonic millisecond time sources.

use core::cell::Cell;

use embassy_time::{Duration, Instant};

/// Source of the current monotonic time.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock backed by the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for simulations and host tests.
///
/// Interior mutability lets the host advance time while the engine holds a
/// shared reference to the same clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    pub const fn starting_at(ms: u64) -> Self {
        Self {
            now_ms: Cell::new(ms),
        }
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set(&self, ms: u64) {
        if ms >= self.now_ms.get() {
            self.now_ms.set(ms);
        }
    }

    /// Move time forward and return the new time.
    pub fn advance(&self, by: Duration) -> Instant {
        self.now_ms
            .set(self.now_ms.get().saturating_add(by.as_millis()));
        self.now()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.now_ms.get())
    }
}
