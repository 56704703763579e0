use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Snapshot of cache traffic counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Mutex-guarded hit/miss accounting shared by every handle to a cache.
pub struct MetricsRecorder {
    inner: Mutex<Counters>,
}

struct Counters {
    hits: u64,
    misses: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters { hits: 0, misses: 0 }),
        }
    }

    pub fn record_hit(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.hits += 1;
        }
    }

    pub fn record_miss(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.misses += 1;
        }
    }

    pub fn snapshot(&self) -> CacheStats {
        if let Ok(counters) = self.inner.lock() {
            CacheStats {
                hits: counters.hits,
                misses: counters.misses,
            }
        } else {
            CacheStats { hits: 0, misses: 0 }
        }
    }

    pub fn reset(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.hits = 0;
            counters.misses = 0;
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_tracks_hits_and_misses() {
        let recorder = MetricsRecorder::new();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_miss();
        assert_eq!(recorder.snapshot(), CacheStats { hits: 2, misses: 1 });
    }

    #[test]
    fn reset_zeroes_the_counters() {
        let recorder = MetricsRecorder::new();
        recorder.record_miss();
        recorder.reset();
        assert_eq!(recorder.snapshot(), CacheStats { hits: 0, misses: 0 });
    }
}
