//! Insertion-ordered batch map.

use std::collections::HashMap;
use std::hash::Hash;

/// Batches keyed by `K`, iterated in the order their keys were first seen.
///
/// Draw order across batches therefore follows submission order, which keeps
/// frames deterministic regardless of hashing.
#[derive(Debug, Clone)]
pub struct BatchMap<K, T> {
    index: HashMap<K, usize>,
    entries: Vec<(K, T)>,
}

impl<K, T> Default for BatchMap<K, T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, T> BatchMap<K, T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the batch for `key`, creating it with `create` on first use.
    pub fn get_or_insert_with(&mut self, key: K, create: impl FnOnce() -> T) -> &mut T {
        let slot = *self.index.entry(key).or_insert_with(|| {
            self.entries.push((key, create()));
            self.entries.len() - 1
        });
        &mut self.entries[slot].1
    }

    /// Get the batch for `key`.
    pub fn get(&self, key: &K) -> Option<&T> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    /// Whether a batch exists for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate batches in first-submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.entries.iter().map(|(key, batch)| (key, batch))
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no batches.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every batch.
    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_submission_order() {
        let mut map: BatchMap<u32, Vec<u32>> = BatchMap::new();
        map.get_or_insert_with(7, Vec::new).push(1);
        map.get_or_insert_with(3, Vec::new).push(2);
        map.get_or_insert_with(7, Vec::new).push(3);

        let keys: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![7, 3]);
        assert_eq!(map.get(&7), Some(&vec![1, 3]));
        assert_eq!(map.len(), 2);

        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains_key(&7));
    }
}
