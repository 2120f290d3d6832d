//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of an engine's counters.
///
/// Counters are monotonic for the life of the engine and only cleared by an
/// explicit [`reset`](crate::engine::CacheEngine::reset_stats).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub l1_hits: u64,
    pub l2_hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub errors: u64,
    pub size_rejections: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn total_hits(&self) -> u64 {
        self.l1_hits + self.l2_hits
    }

    /// Hits over all lookups; 0.0 when nothing has been requested yet.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.total_hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.total_hits() as f64 / total as f64
        }
    }
}

pub(crate) struct AtomicStats {
    pub l1_hits: AtomicU64,
    pub l2_hits: AtomicU64,
    pub misses: AtomicU64,
    pub writes: AtomicU64,
    pub errors: AtomicU64,
    pub size_rejections: AtomicU64,
    pub evictions: AtomicU64,
}

impl AtomicStats {
    pub fn new() -> Self {
        Self {
            l1_hits: AtomicU64::new(0),
            l2_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            size_rejections: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            l1_hits: self.l1_hits.load(Ordering::Relaxed),
            l2_hits: self.l2_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            size_rejections: self.size_rejections.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.l1_hits.store(0, Ordering::Relaxed);
        self.l2_hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.size_rejections.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio_zero_when_empty() {
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }

    #[test]
    fn test_hit_ratio_counts_both_layers() {
        let stats = CacheStats {
            l1_hits: 3,
            l2_hits: 1,
            misses: 4,
            ..Default::default()
        };
        assert_eq!(stats.total_hits(), 4);
        assert_eq!(stats.hit_ratio(), 0.5);
    }

    #[test]
    fn test_reset_clears_all_counters() {
        let atomic = AtomicStats::new();
        atomic.writes.store(7, Ordering::Relaxed);
        atomic.errors.store(2, Ordering::Relaxed);
        atomic.reset();
        assert_eq!(atomic.snapshot(), CacheStats::default());
    }
}
