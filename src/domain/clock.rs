//! Injected wall clock so TTL caches and history are deterministic in tests.

use crate::domain::TimeMs;
use parking_lot::Mutex;
use std::fmt;

/// Millisecond wall clock. Pricing math never reads it; only the caching
/// and history layers do.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> TimeMs;
}

/// Real clock backed by chrono.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeMs {
        TimeMs::new(chrono::Utc::now().timestamp_millis())
    }
}

/// Manually advanced clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Mutex<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Mutex::new(start_ms),
        }
    }

    pub fn advance_ms(&self, delta: i64) {
        *self.now_ms.lock() += delta;
    }

    pub fn set_ms(&self, ms: i64) {
        *self.now_ms.lock() = ms;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeMs {
        TimeMs::new(*self.now_ms.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), TimeMs::new(1_000));
        clock.advance_ms(500);
        assert_eq!(clock.now(), TimeMs::new(1_500));
        clock.set_ms(10);
        assert_eq!(clock.now(), TimeMs::new(10));
    }

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
