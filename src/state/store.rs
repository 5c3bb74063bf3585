//! Value-semantics storage primitives.
//!
//! Handlers keep all of their state in these wrappers. Reads hand out owned
//! copies and writes take ownership of a replacement, so no caller can hold a
//! reference that aliases live state between two actions.

use std::collections::BTreeMap;

/// A single value, copied on every read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Writable<T: Clone> {
    value: T,
}

impl<T: Clone> Writable<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Get a copy of the stored value.
    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Replace the stored value.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Replace the stored value with a function of a copy of it.
    pub fn update(&mut self, f: impl FnOnce(T) -> T) {
        self.value = f(self.value.clone());
    }

    /// Read through a closure without copying.
    ///
    /// The borrow cannot escape the closure.
    pub fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value)
    }
}

/// A keyed collection, copied per entry on every read.
///
/// Ordered by key so snapshots serialize deterministically.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<K: Ord + Clone, V: Clone> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord + Clone, V: Clone> Default for Keyed<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> Keyed<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Get a copy of the entry under `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    /// Insert or replace the entry under `key`.
    pub fn set(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    /// Replace an existing entry with a function of a copy of it.
    ///
    /// Returns false (and stores nothing) when the key is absent.
    pub fn update(&mut self, key: &K, f: impl FnOnce(V) -> V) -> bool {
        match self.entries.get(key).cloned() {
            Some(current) => {
                self.entries.insert(key.clone(), f(current));
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    /// Copies of all values, in key order.
    pub fn values(&self) -> Vec<V> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
