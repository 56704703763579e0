use crate::chain::fingerprint::Fingerprint;
use crate::chain::signal::SignalData;
use crate::prelude::{ChainError, ChainResult};
use crate::telemetry::{CacheStats, MetricsRecorder};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

static PROCESS_CACHE: Lazy<SignalCache> = Lazy::new(SignalCache::new);

struct CacheEntry {
    value: SignalData,
    stamp: String,
}

/// Shared memo store mapping fingerprints to computed signals.
///
/// The handle clones cheaply; every clone sees the same entries. One
/// process-wide instance backs pipelines by default (`shared`), but the
/// store is a first-class object: a fresh instance can be attached per
/// pipeline to keep independent experiments (and tests) isolated. Entries
/// live until `clear`; there is no eviction and no size bound.
#[derive(Clone)]
pub struct SignalCache {
    entries: Arc<Mutex<HashMap<Fingerprint, CacheEntry>>>,
    metrics: Arc<MetricsRecorder>,
}

impl SignalCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    /// Handle to the process-wide default store.
    pub fn shared() -> Self {
        PROCESS_CACHE.clone()
    }

    /// Looks up a fingerprint, checking that the stored entry was produced
    /// by the same stage identity. A mismatch means two distinct operations
    /// collided on one key; that is reported loudly instead of returning
    /// another stage's data.
    pub(crate) fn lookup(
        &self,
        fingerprint: &Fingerprint,
        stamp: &str,
    ) -> ChainResult<Option<SignalData>> {
        let guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.get(fingerprint) {
            Some(entry) if entry.stamp == stamp => {
                self.metrics.record_hit();
                Ok(Some(entry.value.clone()))
            }
            Some(entry) => Err(ChainError::CacheInconsistency {
                fingerprint: fingerprint.short(),
                stored: entry.stamp.clone(),
                requested: stamp.to_string(),
            }),
            None => {
                self.metrics.record_miss();
                Ok(None)
            }
        }
    }

    pub(crate) fn store(&self, fingerprint: Fingerprint, stamp: String, value: SignalData) {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(fingerprint, CacheEntry { value, stamp });
    }

    /// Evicts every entry, process-wide for the default store. The next run
    /// of any pipeline consulting this store recomputes from scratch.
    pub fn clear(&self) {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clear();
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }
}

impl Default for SignalCache {
    fn default() -> Self {
        Self::new()
    }
}
