// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time source behind throttling and the `Time` kind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic millisecond clock the runtime reads for throttling and
/// time-driven kinds. Swappable so tests can step time by hand.
pub trait Clock: Send {
    /// Milliseconds since the clock's origin.
    fn now_millis(&self) -> u64;
}

/// Wall clock measured from process start.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock with its origin at now.
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
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-stepped clock for deterministic tests. Clones share the same
/// underlying counter, so a test can hold one half and hand the other
/// to the runtime.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set an absolute time.
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        clock.advance(33);
        assert_eq!(handle.now_millis(), 33);
        handle.set(100);
        assert_eq!(clock.now_millis(), 100);
    }
}
