use std::collections::BTreeMap;
use std::ops::Bound;

use crate::KVPair;

/// Ordered key index backing the [`MemStore`](crate::engine::MemStore).
///
/// Keys iterate in byte-lexicographic order, so every key sharing a prefix
/// sits in one contiguous range.
#[derive(Debug, Default, Clone)]
pub struct PrefixIndex {
    entries: BTreeMap<String, KVPair>,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&KVPair> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces the entry for `key`, returning the previous one.
    pub fn insert(&mut self, key: &str, value: &str) -> Option<KVPair> {
        self.entries.insert(key.to_string(), KVPair::new(key, value))
    }

    pub fn remove(&mut self, key: &str) -> Option<KVPair> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KVPair> {
        self.entries.values()
    }

    /// Iterates, in key order, over every entry whose key starts with `prefix`.
    pub fn scan_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a KVPair> + 'a {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(_, kv)| kv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(keys: &[&str]) -> PrefixIndex {
        let mut index = PrefixIndex::new();
        for key in keys {
            index.insert(key, "v");
        }
        index
    }

    #[test]
    fn test_insert_replaces_and_keeps_key() {
        let mut index = PrefixIndex::new();
        assert!(index.insert("/a", "1").is_none());
        assert_eq!(index.insert("/a", "2"), Some(KVPair::new("/a", "1")));
        assert_eq!(index.get("/a"), Some(&KVPair::new("/a", "2")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut index = index_of(&["/a"]);
        assert!(index.remove("/a").is_some());
        assert!(index.remove("/a").is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_iter_is_key_ordered() {
        let index = index_of(&["/b", "/a/z", "/a", "/a/b"]);
        let keys: Vec<&str> = index.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["/a", "/a/b", "/a/z", "/b"]);
    }

    #[test]
    fn test_scan_prefix_stops_at_range_end() {
        let index = index_of(&["/a/b", "/a/b/c", "/a/bc", "/a/c", "/b"]);
        let keys: Vec<&str> = index.scan_prefix("/a/b/").map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["/a/b/c"]);

        let keys: Vec<&str> = index.scan_prefix("/a/b").map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["/a/b", "/a/b/c", "/a/bc"]);

        assert_eq!(index.scan_prefix("/z").count(), 0);
    }
}
