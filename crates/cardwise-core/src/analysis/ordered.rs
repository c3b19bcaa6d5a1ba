//! Insertion-ordered string-keyed map
//!
//! Ranking helpers sort stably, so among equal values the key that was
//! inserted first always wins.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the value for `key`, inserting `V::default()` first
    pub fn entry(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.entries.push((key.to_string(), V::default()));
                let idx = self.entries.len() - 1;
                self.index.insert(key.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted descending by `key_fn`, ties kept in insertion order
    pub fn ranked_by<K, F>(&self, key_fn: F) -> Vec<(&str, &V)>
    where
        K: PartialOrd,
        F: Fn(&V) -> K,
    {
        let mut ranked: Vec<(&str, &V)> = self.iter().collect();
        ranked.sort_by(|a, b| {
            key_fn(b.1)
                .partial_cmp(&key_fn(a.1))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Key of the highest-ranked entry
    pub fn top_key_by<K, F>(&self, key_fn: F) -> Option<&str>
    where
        K: PartialOrd,
        F: Fn(&V) -> K,
    {
        self.ranked_by(key_fn).first().map(|(k, _)| *k)
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_accumulates_in_insertion_order() {
        let mut map: OrderedMap<u32> = OrderedMap::new();
        *map.entry("b") += 1;
        *map.entry("a") += 1;
        *map.entry("b") += 1;

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("zzz"), None);
    }

    #[test]
    fn test_ranked_ties_keep_insertion_order() {
        let mut map: OrderedMap<u32> = OrderedMap::new();
        *map.entry("first") += 2;
        *map.entry("second") += 3;
        *map.entry("third") += 3;
        *map.entry("fourth") += 2;

        let ranked: Vec<&str> = map.ranked_by(|v| *v).into_iter().map(|(k, _)| k).collect();
        assert_eq!(ranked, vec!["second", "third", "first", "fourth"]);
        assert_eq!(map.top_key_by(|v| *v), Some("second"));
    }

    #[test]
    fn test_top_key_of_empty_map() {
        let map: OrderedMap<u32> = OrderedMap::new();
        assert_eq!(map.top_key_by(|v| *v), None);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let mut map: OrderedMap<u32> = OrderedMap::new();
        *map.entry("z") += 1;
        *map.entry("a") += 2;

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
    }
}
