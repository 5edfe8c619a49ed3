//! In-memory TTL cache for market contexts, keyed by (symbol, timeframe).
//!
//! - Reads drop an expired entry and report a miss.
//! - Inserting at capacity first purges every expired entry, then evicts the
//!   entry with the oldest insertion time if still full.
//!
//! The cache is shared behind an `Arc`; all state sits in one `Mutex`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: String,
}

impl CacheKey {
    pub fn new(symbol: &str, timeframe: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct AnalysisCache<V> {
    entries: Mutex<HashMap<CacheKey, Entry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> AnalysisCache<V> {
    /// A cache of at most `max_entries` (minimum 1) whose entries live for `ttl`.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.lock().remove(key).map(|e| e.value)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, expired ones included until they are purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => self.is_expired(entry, now),
        };
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    fn insert_at(&self, key: CacheKey, value: V, now: Instant) {
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            entries.retain(|_, e| !self.is_expired(e, now));
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Entry<V>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
