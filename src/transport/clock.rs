//! Microsecond time sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Free-running microsecond counter.
///
/// The counter wraps at `u32::MAX`; consumers compare timestamps with
/// `wrapping_sub` so a wrap in the middle of a transaction is harmless.
pub trait Clock {
    /// Current time in microseconds.
    fn now_micros(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> u32 {
        (**self).now_micros()
    }
}

/// Microseconds elapsed from `since` to `now`, tolerant of counter wrap.
#[must_use]
pub const fn elapsed_micros(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Clock backed by [`Instant`], counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a new clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_micros(&self) -> u32 {
        // Truncation is the intended wrap.
        self.origin.elapsed().as_micros() as u32
    }
}

/// Manually advanced clock shared between clones.
///
/// Used to drive the state machine deterministically in tests and
/// simulations.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    #[must_use]
    pub fn new(start: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(start)),
        }
    }

    /// Move time forward, wrapping on overflow.
    pub fn advance(&self, micros: u32) {
        let now = self.now.load(Ordering::Relaxed);
        self.now.store(now.wrapping_add(micros), Ordering::Relaxed);
    }

    /// Jump to an absolute reading.
    pub fn set(&self, micros: u32) {
        self.now.store(micros, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(100);
        let other = clock.clone();
        other.advance(50);
        assert_eq!(clock.now_micros(), 150);
        clock.set(7);
        assert_eq!(other.now_micros(), 7);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        let clock = ManualClock::new(u32::MAX - 9);
        let start = clock.now_micros();
        clock.advance(30);
        assert_eq!(clock.now_micros(), 20);
        assert_eq!(elapsed_micros(clock.now_micros(), start), 30);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_micros();
        let b = clock.now_micros();
        assert!(elapsed_micros(b, a) < 1_000_000);
    }
}
