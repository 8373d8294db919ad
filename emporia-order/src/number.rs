use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Datelike, Utc};

/// Allocates human-readable order numbers: `ORD-{year}-{6-digit suffix}`.
///
/// The original scheme derived the suffix straight from wall-clock digits,
/// which can collide under concurrent checkouts. Here the wall clock only
/// seeds a process-wide counter, so two allocations in the same process never
/// collide; across processes the storage layer's UNIQUE constraint on the
/// number is the backstop. The suffix wraps at one million.
pub struct OrderNumberAllocator {
    counter: AtomicU64,
}

impl OrderNumberAllocator {
    pub fn new() -> Self {
        let seed = Utc::now().timestamp_micros() as u64 % 1_000_000;
        Self {
            counter: AtomicU64::new(seed),
        }
    }

    pub fn allocate(&self, now: DateTime<Utc>) -> String {
        let suffix = self.counter.fetch_add(1, Ordering::Relaxed) % 1_000_000;
        format!("ORD-{}-{:06}", now.year(), suffix)
    }
}

impl Default for OrderNumberAllocator {
    fn default() -> Self {
        Self::new()
    }
}
