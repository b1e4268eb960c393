//! Single-claim store for state that must outlive one crop view.
//!
//! A host that tears its view down (e.g. on a configuration change) deposits
//! the decoded bitmap here and keeps the returned key in the session snapshot.
//! The restored session claims it exactly once. The cache is owned by the host,
//! so there is no process-wide slot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key returned by [`HandoffCache::deposit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandoffKey(u64);

impl HandoffKey {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct HandoffCache<T> {
    entries: HashMap<HandoffKey, T>,
    next_key: u64,
}

impl<T> Default for HandoffCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_key: 0,
        }
    }
}

impl<T> HandoffCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a fresh key.
    pub fn deposit(&mut self, value: T) -> HandoffKey {
        self.next_key += 1;
        let key = HandoffKey(self.next_key);
        self.entries.insert(key, value);
        key
    }

    /// Remove and return the value. A second claim returns `None`.
    pub fn claim(&mut self, key: &HandoffKey) -> Option<T> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let mut cache = HandoffCache::new();
        let key = cache.deposit(vec![1u8, 2, 3]);
        assert_eq!(cache.claim(&key), Some(vec![1, 2, 3]));
        assert_eq!(cache.claim(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_distinct() {
        let mut cache = HandoffCache::new();
        let a = cache.deposit("a");
        let b = cache.deposit("b");
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.claim(&b), Some("b"));
        assert_eq!(cache.claim(&a), Some("a"));
    }

    #[test]
    fn test_unknown_key() {
        let mut cache: HandoffCache<u32> = HandoffCache::new();
        let mut other = HandoffCache::new();
        let key = other.deposit(5u32);
        assert_eq!(cache.claim(&key), None);
    }
}
