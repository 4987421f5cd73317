//! Logical clock.
//!
//! Hands out process-wide unique timestamps. The first timestamp is 1 and
//! values are contiguous, so a run with N accesses uses exactly `1..=N`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Logical timestamp marking event order.
pub type Timestamp = u64;

/// Monotonic counter producing unique timestamps.
#[derive(Debug, Default)]
pub struct LogicalClock {
    last: AtomicU64,
}

impl LogicalClock {
    /// Create a clock that has issued no timestamps.
    pub fn new() -> Self {
        Self { last: AtomicU64::new(0) }
    }

    /// Allocate the next timestamp.
    ///
    /// Safe to call concurrently: no two callers observe the same value and
    /// values issued later are strictly greater.
    pub fn next(&self) -> Timestamp {
        self.last.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Last timestamp issued, or 0 if none.
    pub fn current(&self) -> Timestamp {
        self.last.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use super::*;

    #[test]
    fn first_timestamp_is_one() {
        let clock = LogicalClock::new();
        assert_eq!(clock.current(), 0);
        assert_eq!(clock.next(), 1);
        assert_eq!(clock.next(), 2);
        assert_eq!(clock.current(), 2);
    }

    #[test]
    fn concurrent_callers_get_distinct_values() {
        let clock = Arc::new(LogicalClock::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let clock = Arc::clone(&clock);
                thread::spawn(move || (0..250).map(|_| clock.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for ts in handle.join().unwrap() {
                assert!(seen.insert(ts), "duplicate timestamp {ts}");
            }
        }

        assert_eq!(seen.len(), 2000);
        assert_eq!(seen.iter().copied().max(), Some(2000));
        assert_eq!(seen.iter().copied().min(), Some(1));
    }

    #[test]
    fn values_increase_per_caller() {
        let clock = LogicalClock::new();
        let mut prev = 0;
        for _ in 0..100 {
            let ts = clock.next();
            assert!(ts > prev);
            prev = ts;
        }
    }
}
