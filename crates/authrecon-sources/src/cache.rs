//! LRU response cache keyed by the exact outbound URL.
//!
//! Pass-through only: a hit returns the same body the upstream returned, so
//! parsing and scoring are unaffected. Default: 1000 entries, 1-hour TTL.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct CacheEntry {
    body: String,
    inserted_at: Instant,
}

/// Thread-safe LRU cache of upstream response bodies.
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Least recently used first.
    order: VecDeque<String>,
    max_size: usize,
    ttl: Duration,
}

impl CacheInner {
    fn touch(&mut self, url: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == url) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }

    fn remove(&mut self, url: &str) {
        self.entries.remove(url);
        self.order.retain(|k| k != url);
    }
}

impl ResponseCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: VecDeque::with_capacity(max_size),
                max_size,
                ttl,
            }),
        }
    }

    /// Get a cached body. Returns None on miss or expired entry.
    pub fn get(&self, url: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let ttl = inner.ttl;

        let body = match inner.entries.get(url) {
            None => return None,
            Some(entry) if entry.inserted_at.elapsed() >= ttl => None,
            Some(entry) => Some(entry.body.clone()),
        };

        match body {
            Some(body) => {
                inner.touch(url);
                Some(body)
            }
            None => {
                inner.remove(url);
                None
            }
        }
    }

    /// Store a body, evicting the least recently used entry at capacity.
    pub fn put(&self, url: String, body: String) {
        let mut inner = self.inner.lock();
        if inner.max_size == 0 {
            return;
        }

        if inner.entries.contains_key(&url) {
            inner.touch(&url);
        } else {
            while inner.entries.len() >= inner.max_size {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(url.clone());
        }

        inner.entries.insert(
            url,
            CacheEntry {
                body,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
