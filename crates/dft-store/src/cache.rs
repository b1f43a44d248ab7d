//! Bounded, thread-safe LRU cache.
//!
//! Entries live in a slab of doubly-linked nodes; a `HashMap` indexes keys
//! into the slab. Every operation is O(1) and runs under one mutex per
//! instance. Nothing inside the critical sections performs I/O.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::metrics;

const NIL: usize = usize::MAX;

struct Node<V> {
    key: String,
    value: V,
    prev: usize,
    next: usize,
}

struct LruState<V> {
    index: HashMap<String, usize>,
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    /// Most recently used
    head: usize,
    /// Least recently used
    tail: usize,
}

impl<V> LruState<V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    fn node(&self, slot: usize) -> &Node<V> {
        match &self.nodes[slot] {
            Some(node) => node,
            None => unreachable!("indexed slot {slot} is vacant"),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<V> {
        match &mut self.nodes[slot] {
            Some(node) => node,
            None => unreachable!("indexed slot {slot} is vacant"),
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            self.node_mut(prev).next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.node_mut(next).prev = prev;
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(slot);
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head == NIL {
            self.tail = slot;
        } else {
            self.node_mut(old_head).prev = slot;
        }
        self.head = slot;
    }

    fn promote(&mut self, slot: usize) {
        if self.head != slot {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    fn insert_front(&mut self, key: String, value: V) {
        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.index.insert(key, slot);
        self.push_front(slot);
    }

    fn remove_slot(&mut self, slot: usize) -> Option<(String, V)> {
        self.unlink(slot);
        let node = self.nodes[slot].take()?;
        self.free.push(slot);
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }

    fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }
}

/// A key/value cache holding at most `capacity` entries.
///
/// Reads through [`get`](Self::get) and writes through [`put`](Self::put)
/// mark an entry most recently used; when an insert pushes the size over
/// capacity the least recently used entry is dropped.
pub struct BoundedCache<V> {
    name: &'static str,
    capacity: usize,
    state: Mutex<LruState<V>>,
}

impl<V: Clone> BoundedCache<V> {
    /// Create a cache. A zero capacity is raised to 1.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!(cache = name, "Cache capacity 0 is not allowed, using 1");
            1
        } else {
            capacity
        };
        Self {
            name,
            capacity,
            state: Mutex::new(LruState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruState<V>> {
        // Operations never leave the list half-linked, so a poisoned lock
        // still guards a consistent state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a key and mark it most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = self.lock();
        let slot = *state.index.get(key)?;
        state.promote(slot);
        Some(state.node(slot).value.clone())
    }

    /// Insert or overwrite a key and mark it most recently used.
    ///
    /// Returns the entry evicted to stay within capacity, if any.
    pub fn put(&self, key: impl Into<String>, value: V) -> Option<(String, V)> {
        let key = key.into();
        let evicted = {
            let mut state = self.lock();
            if let Some(&slot) = state.index.get(&key) {
                state.node_mut(slot).value = value;
                state.promote(slot);
                None
            } else {
                state.insert_front(key, value);
                if state.index.len() > self.capacity {
                    let tail = state.tail;
                    state.remove_slot(tail)
                } else {
                    None
                }
            }
        };

        if let Some((evicted_key, _)) = &evicted {
            debug!(cache = self.name, key = %evicted_key, "Evicted least recently used entry");
            metrics::record_eviction(self.name);
        }
        evicted
    }

    /// Remove a key. Missing keys are ignored.
    pub fn delete(&self, key: &str) -> Option<V> {
        let mut state = self.lock();
        let slot = *state.index.get(key)?;
        state.remove_slot(slot).map(|(_, value)| value)
    }

    /// Check presence without changing recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().index.contains_key(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        let state = self.lock();
        let mut keys = Vec::with_capacity(state.index.len());
        let mut cursor = state.head;
        while cursor != NIL {
            let node = state.node(cursor);
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }
}

impl<V> std::fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_keeps_most_recent_keys() {
        let cache = BoundedCache::new("test", 3);
        for i in 0..10 {
            cache.put(format!("k{i}"), i);
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.keys_by_recency(), vec!["k9", "k8", "k7"]);
        assert!(cache.get("k6").is_none());
    }

    #[test]
    fn test_get_promotes() {
        let cache = BoundedCache::new("test", 2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get("a"), Some(1));

        let evicted = cache.put("c", 3);
        assert_eq!(evicted, Some(("b".to_string(), 2)));
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_contains_does_not_promote() {
        let cache = BoundedCache::new("test", 2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.contains("a"));

        cache.put("c", 3);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_overwrite_promotes_without_growing() {
        let cache = BoundedCache::new("test", 2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.put("a", 10).is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.keys_by_recency(), vec!["a", "b"]);
        assert_eq!(cache.get("a"), Some(10));
    }

    #[test]
    fn test_delete_and_reuse_slots() {
        let cache = BoundedCache::new("test", 3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        assert_eq!(cache.delete("b"), Some(2));
        assert_eq!(cache.delete("b"), None);
        assert_eq!(cache.keys_by_recency(), vec!["c", "a"]);

        cache.put("d", 4);
        cache.put("e", 5);
        assert_eq!(cache.keys_by_recency(), vec!["e", "d", "c"]);
    }

    #[test]
    fn test_clear() {
        let cache = BoundedCache::new("test", 2);
        cache.put("a", 1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
        cache.put("b", 2);
        assert_eq!(cache.keys_by_recency(), vec!["b"]);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let cache = BoundedCache::new("test", 0);
        assert_eq!(cache.capacity(), 1);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.keys_by_recency(), vec!["b"]);
    }

    #[test]
    fn test_concurrent_puts_stay_bounded() {
        let cache = Arc::new(BoundedCache::new("test", 50));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        cache.put(format!("{t}-{i}"), i);
                        cache.get(&format!("{t}-{}", i / 2));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 50);
        assert_eq!(cache.keys_by_recency().len(), 50);
    }
}
