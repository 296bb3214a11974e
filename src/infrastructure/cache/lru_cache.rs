//! Bounded least-recently-used cache.

use std::collections::HashMap;
use std::mem;

use parking_lot::Mutex;

const NIL: usize = usize::MAX;

struct Entry {
    key: String,
    value: String,
    prev: usize,
    next: usize,
}

/// Slab of entries threaded into a recency list, most recent at `head`.
struct LruState {
    index: HashMap<String, usize>,
    entries: Vec<Entry>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    hits: u64,
    misses: u64,
}

impl LruState {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            hits: 0,
            misses: 0,
        }
    }

    fn detach(&mut self, i: usize) {
        let (prev, next) = (self.entries[i].prev, self.entries[i].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.entries[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.entries[next].prev = prev;
        }
    }

    fn push_front(&mut self, i: usize) {
        self.entries[i].prev = NIL;
        self.entries[i].next = self.head;
        if self.head == NIL {
            self.tail = i;
        } else {
            self.entries[self.head].prev = i;
        }
        self.head = i;
    }

    fn promote(&mut self, i: usize) {
        if self.head != i {
            self.detach(i);
            self.push_front(i);
        }
    }

    fn allocate(&mut self, key: String, value: String) -> usize {
        let entry = Entry {
            key,
            value,
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(i) => {
                self.entries[i] = entry;
                i
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        }
    }

    fn evict_lru(&mut self) {
        let i = self.tail;
        if i == NIL {
            return;
        }
        self.detach(i);
        let key = mem::take(&mut self.entries[i].key);
        self.entries[i].value = String::new();
        self.index.remove(&key);
        self.free.push(i);
    }
}

/// Fixed-capacity key/value cache with least-recently-used eviction.
///
/// Every hit and every `put` moves the entry to the most-recently-used
/// position. A `put` that grows the cache past its capacity evicts exactly
/// one entry, the least recently used. Capacities of 0 and 1 are valid.
///
/// Hit and miss counters only ever grow for the lifetime of the instance;
/// [`LruCache::clear`] drops entries but keeps the counters.
pub struct LruCache {
    capacity: usize,
    state: Mutex<LruState>,
}

impl LruCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(LruState::new()),
        }
    }

    /// Looks up `key`, recording a hit or a miss.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock();
        let slot = state.index.get(key).copied();
        match slot {
            Some(i) => {
                state.hits += 1;
                state.promote(i);
                Some(state.entries[i].value.clone())
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Inserts or updates `key`, then evicts the least recently used entry if
    /// the cache is over capacity.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let mut state = self.state.lock();

        let existing = state.index.get(&key).copied();
        if let Some(i) = existing {
            state.entries[i].value = value;
            state.promote(i);
            return;
        }

        let i = state.allocate(key.clone(), value);
        state.index.insert(key, i);
        state.push_front(i);

        if state.index.len() > self.capacity {
            state.evict_lru();
        }
    }

    /// Returns true if `key` is cached, without touching recency or counters.
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().index.contains_key(key)
    }

    /// Fraction of lookups that were hits, `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let state = self.state.lock();
        let total = state.hits + state.misses;
        if total == 0 {
            return 0.0;
        }
        state.hits as f64 / total as f64
    }

    pub fn hits(&self) -> u64 {
        self.state.lock().hits
    }

    pub fn misses(&self) -> u64 {
        self.state.lock().misses
    }

    pub fn size(&self) -> usize {
        self.state.lock().index.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.index.clear();
        state.entries.clear();
        state.free.clear();
        state.head = NIL;
        state.tail = NIL;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_then_get() {
        let cache = LruCache::new(4);
        cache.put("abc123", "https://example.com");

        assert_eq!(cache.get("abc123").as_deref(), Some("https://example.com"));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_overflow_evicts_least_recently_used() {
        let cache = LruCache::new(3);
        cache.put("a", "1");
        cache.put("b", "2");
        cache.put("c", "3");
        cache.put("d", "4");

        assert_eq!(cache.size(), 3);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn test_get_promotes_entry() {
        let cache = LruCache::new(3);
        cache.put("a", "1");
        cache.put("b", "2");
        cache.put("c", "3");

        assert!(cache.get("a").is_some());
        cache.put("d", "4");

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_update_promotes_without_growing() {
        let cache = LruCache::new(2);
        cache.put("a", "1");
        cache.put("b", "2");
        cache.put("a", "updated");
        cache.put("c", "3");

        assert_eq!(cache.size(), 2);
        assert!(!cache.contains("b"));
        assert_eq!(cache.get("a").as_deref(), Some("updated"));
    }

    #[test]
    fn test_eviction_order_follows_recency_over_many_puts() {
        let cache = LruCache::new(2);
        for i in 0..100 {
            cache.put(format!("k{i}"), i.to_string());
            assert!(cache.size() <= 2);
        }
        assert!(cache.contains("k98"));
        assert!(cache.contains("k99"));
        assert!(!cache.contains("k97"));
    }

    #[test]
    fn test_zero_capacity_caches_nothing() {
        let cache = LruCache::new(0);
        cache.put("a", "1");

        assert_eq!(cache.size(), 0);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_single_slot_keeps_latest() {
        let cache = LruCache::new(1);
        cache.put("a", "1");
        cache.put("b", "2");

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_hit_rate_is_exact() {
        let cache = LruCache::new(10);
        assert_eq!(cache.hit_rate(), 0.0);

        cache.put("a", "1");
        for _ in 0..3 {
            cache.get("a");
        }
        cache.get("missing");

        assert_eq!(cache.hits(), 3);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hit_rate(), 3.0 / 4.0);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let cache = LruCache::new(10);
        cache.put("a", "1");
        cache.get("a");
        cache.get("b");

        cache.clear();

        assert_eq!(cache.size(), 0);
        assert_eq!(cache.hit_rate(), 0.5);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_reuses_slots_after_clear_and_eviction() {
        let cache = LruCache::new(2);
        cache.put("a", "1");
        cache.put("b", "2");
        cache.put("c", "3");
        cache.clear();
        cache.put("d", "4");
        cache.put("e", "5");
        cache.put("f", "6");

        assert!(!cache.contains("d"));
        assert_eq!(cache.get("e").as_deref(), Some("5"));
        assert_eq!(cache.get("f").as_deref(), Some("6"));
    }

    #[test]
    fn test_concurrent_access_respects_capacity() {
        let cache = Arc::new(LruCache::new(64));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..1_000 {
                        let key = format!("{t}-{}", i % 100);
                        cache.put(key.clone(), "v");
                        cache.get(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.size() <= 64);
        assert_eq!(cache.hits() + cache.misses(), 4_000);
    }
}
