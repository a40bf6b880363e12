/// File server visit counter
///
/// Counts requests served under `/app`. Lives in [`crate::app::AppState`]
/// so each router (and each test) gets its own counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic request counter
#[derive(Debug, Default)]
pub struct HitCounter {
    hits: AtomicU64,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one hit and returns the new total
    pub fn increment(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}
