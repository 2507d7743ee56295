// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

// ── OrderedStore ────────────────────────────────────────────────────────

/// Insertion-ordered associative store with linear lookup.
///
/// Keys are compared with [`PartialEq`]; the store never deduplicates, so the
/// same key may appear several times. Every lookup and removal resolves to the
/// **first** matching entry in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedStore<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for OrderedStore<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, V> OrderedStore<K, V> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry after all existing entries.
    pub fn add(&mut self, key: K, value: V) {
        self.entries.push((key, value));
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Calls `f` for every entry in insertion order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in &self.entries {
            f(k, v);
        }
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: PartialEq, V> OrderedStore<K, V> {
    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Returns `true` if any entry has `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Value of the first entry whose key equals `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Mutable access to the value of the first entry whose key equals `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.position(key)?;
        Some(&mut self.entries[idx].1)
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a K) -> impl Iterator<Item = &'a V> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Removes the first entry whose key equals `key` and returns its value.
    ///
    /// Later duplicates are left in place. Does nothing if `key` is absent.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }
}

impl<K, V: PartialEq> OrderedStore<K, V> {
    /// Returns `true` if any entry holds `value`.
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.entries.iter().any(|(_, v)| v == value)
    }
}

impl<K: PartialEq, V: PartialEq> OrderedStore<K, V> {
    /// Returns `true` if some single entry holds both `key` and `value`.
    #[must_use]
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.entries.iter().any(|(k, v)| k == key && v == value)
    }
}

// ── Iteration ───────────────────────────────────────────────────────────

/// Borrowing iterator over `(&K, &V)` pairs, produced by [`OrderedStore::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    inner: std::slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a OrderedStore<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for OrderedStore<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedStore<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for OrderedStore<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderedStore<String, i32> {
        let mut s = OrderedStore::new();
        s.add("a".to_string(), 1);
        s.add("b".to_string(), 2);
        s
    }

    #[test]
    fn new_store_is_empty() {
        let s: OrderedStore<String, i32> = OrderedStore::new();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert_eq!(s.iter().count(), 0);
    }

    #[test]
    fn add_then_contains() {
        let s = sample();
        assert!(s.contains_key(&"a".to_string()));
        assert!(s.contains_value(&2));
        assert!(s.contains(&"b".to_string(), &2));
        assert!(!s.contains(&"a".to_string(), &2));
    }

    #[test]
    fn get_missing_is_none() {
        let s = sample();
        assert_eq!(s.get(&"zzz".to_string()), None);
    }

    #[test]
    fn get_first_match_wins() {
        let mut s = OrderedStore::new();
        s.add("dup", 1);
        s.add("other", 2);
        s.add("dup", 3);
        assert_eq!(s.get(&"dup"), Some(&1));
        assert_eq!(s.get_all(&"dup").copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn get_mut_updates_first_match() {
        let mut s = OrderedStore::new();
        s.add("dup", 1);
        s.add("dup", 2);
        *s.get_mut(&"dup").unwrap() = 10;
        assert_eq!(s.values().copied().collect::<Vec<_>>(), vec![10, 2]);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut s = sample();
        let before = s.clone();
        assert_eq!(s.remove(&"zzz".to_string()), None);
        assert_eq!(s, before);
    }

    #[test]
    fn remove_takes_only_first_duplicate() {
        let mut s = OrderedStore::new();
        s.add("dup", 1);
        s.add("keep", 2);
        s.add("dup", 3);
        assert_eq!(s.remove(&"dup"), Some(1));
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(&"dup"), Some(&3));
        assert_eq!(
            s.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
            vec![("keep", 2), ("dup", 3)]
        );
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut s = OrderedStore::new();
        for (i, k) in ["x", "y", "z"].into_iter().enumerate() {
            s.add(k, i);
        }
        s.remove(&"y");
        assert_eq!(s.keys().copied().collect::<Vec<_>>(), vec!["x", "z"]);
    }

    #[test]
    fn for_each_visits_in_insertion_order() {
        let s = sample();
        let mut seen = Vec::new();
        s.for_each(|k, v| seen.push((k.clone(), *v)));
        assert_eq!(seen, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn iter_is_double_ended_and_exact() {
        let s = sample();
        let it = s.iter();
        assert_eq!(it.len(), 2);
        let last = s.iter().next_back().map(|(k, _)| k.as_str());
        assert_eq!(last, Some("b"));
    }

    #[test]
    fn from_iter_and_extend() {
        let mut s: OrderedStore<&str, i32> = [("a", 1)].into_iter().collect();
        s.extend([("b", 2), ("c", 3)]);
        assert_eq!(s.len(), 3);
        let owned: Vec<_> = s.into_iter().collect();
        assert_eq!(owned, vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn clear_empties() {
        let mut s = sample();
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn serializes_as_pair_list() {
        let s = sample();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"[["a",1],["b",2]]"#);
        let back: OrderedStore<String, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
