//! Response cache keyed by request signature.
//!
//! Time-bounded and size-bounded: entries expire after a configurable TTL
//! and the store evicts the oldest-inserted entry (insertion order, not LRU)
//! once it holds more than `max_entries`. A disabled cache bypasses both the
//! read and the write path.

mod lock;

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use metrics::counter;
use serde_json::Value;

use lock::mutex_lock;

const SOURCE: &str = "cache";

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_MAX_ENTRIES: usize = 100;

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// A disabled configuration: `get` always misses and `set` is a no-op.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn max_entries_non_zero(&self) -> usize {
        self.max_entries.max(1)
    }
}

struct Entry {
    payload: Value,
    inserted: Instant,
}

struct Inner {
    entries: HashMap<String, Entry>,
    // Insertion order; may hold dangling keys for entries removed on expiry.
    order: VecDeque<String>,
}

/// In-memory response cache shared by one client instance.
pub struct ResponseCache {
    config: CacheConfig,
    inner: Mutex<Inner>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Look up a fresh entry. Stale entries are removed on read.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    /// Insert or overwrite, evicting the oldest-inserted entry past the bound.
    pub fn set(&self, key: &str, payload: Value) {
        self.set_at(key, payload, Instant::now());
    }

    pub fn clear(&self) {
        let mut inner = mutex_lock(&self.inner, SOURCE, "clear");
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.inner, SOURCE, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        if !self.config.enabled {
            return None;
        }

        let mut inner = mutex_lock(&self.inner, SOURCE, "get");
        let fresh = match inner.entries.get(key) {
            Some(entry) => now.duration_since(entry.inserted) < self.config.ttl,
            None => {
                counter!("foglio_cache_miss_total").increment(1);
                return None;
            }
        };

        if !fresh {
            inner.entries.remove(key);
            counter!("foglio_cache_miss_total").increment(1);
            return None;
        }

        counter!("foglio_cache_hit_total").increment(1);
        inner.entries.get(key).map(|entry| entry.payload.clone())
    }

    fn set_at(&self, key: &str, payload: Value, now: Instant) {
        if !self.config.enabled {
            return;
        }

        let mut inner = mutex_lock(&self.inner, SOURCE, "set");
        let previous = inner.entries.insert(
            key.to_string(),
            Entry {
                payload,
                inserted: now,
            },
        );
        // Overwrites keep the key's original insertion-order slot.
        if previous.is_none() {
            inner.order.push_back(key.to_string());
        }

        let bound = self.config.max_entries_non_zero();
        while inner.entries.len() > bound {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            // Dangling queue entries (expired on read) are skipped silently.
            if inner.entries.remove(&oldest).is_some() {
                counter!("foglio_cache_evict_total").increment(1);
            }
        }
    }
}
