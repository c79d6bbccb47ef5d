//! Fingerprint cache shared by all loaded keys.
//!
//! Keys are identified by a [`KeyIdentity`] handed out by the cache itself, so
//! identities are unique for the lifetime of the cache. A key clears its
//! entries when it is destroyed. The cache is a pure memoisation: a disabled
//! cache yields byte-identical results, only slower.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

use keyward_core::CacheConfig;

use crate::scheme::KeyEncoding;

/// Cache key of one loaded key object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyIdentity(u64);

impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key#{}", self.0)
    }
}

/// Hit/miss counters for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct FingerprintCache {
    enabled: bool,
    next_identity: AtomicU64,
    entries: Mutex<HashMap<KeyIdentity, HashMap<KeyEncoding, Vec<u8>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintCache {
    /// Create an empty, enabled cache.
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// Create a cache that never stores anything.
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_enabled(config.enabled)
    }

    fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            next_identity: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Hand out a fresh identity for a newly constructed key.
    pub fn allocate_identity(&self) -> KeyIdentity {
        KeyIdentity(self.next_identity.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self, identity: KeyIdentity, encoding: KeyEncoding) -> Option<Vec<u8>> {
        let found = self
            .entries
            .lock()
            .get(&identity)
            .and_then(|entries| entries.get(&encoding))
            .cloned();

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn put(&self, identity: KeyIdentity, encoding: KeyEncoding, bytes: Vec<u8>) {
        if !self.enabled {
            return;
        }
        self.entries
            .lock()
            .entry(identity)
            .or_default()
            .insert(encoding, bytes);
    }

    /// Look up an entry, computing and storing it on a miss.
    ///
    /// `compute` runs without the lock held. Concurrent misses may compute
    /// the same value twice; the first stored value wins.
    pub fn get_or_compute<F>(
        &self,
        identity: KeyIdentity,
        encoding: KeyEncoding,
        compute: F,
    ) -> Option<Vec<u8>>
    where
        F: FnOnce() -> Option<Vec<u8>>,
    {
        if let Some(bytes) = self.get(identity, encoding) {
            return Some(bytes);
        }

        let bytes = compute()?;
        if !self.enabled {
            return Some(bytes);
        }

        let mut entries = self.entries.lock();
        let stored = entries
            .entry(identity)
            .or_default()
            .entry(encoding)
            .or_insert(bytes);
        Some(stored.clone())
    }

    /// Remove every entry held for `identity`.
    pub fn clear(&self, identity: KeyIdentity) {
        if let Some(removed) = self.entries.lock().remove(&identity) {
            trace!(%identity, entries = removed.len(), "cleared fingerprint cache");
        }
    }

    /// Total number of cached entries across all identities.
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
