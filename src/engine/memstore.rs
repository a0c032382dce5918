use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::engine::index::PrefixIndex;
use crate::engine::pattern::Pattern;
use crate::{DirectoryLister, KVPair, KVReader, KVWriter, Result};

const SEPARATOR: char = '/';

/// An in-memory key/value store safe for concurrent access.
///
/// A single readers-writer lock guards the whole index: queries share it,
/// mutations hold it exclusively.
#[derive(Default)]
pub struct MemStore {
    index: RwLock<PrefixIndex>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding the given key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut index = PrefixIndex::new();
        for (key, value) in pairs {
            index.insert(key.as_ref(), value.as_ref());
        }
        Self {
            index: RwLock::new(index),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every operation leaves the index consistent, so a panic in another
    // holder does not invalidate it.
    fn read(&self) -> RwLockReadGuard<'_, PrefixIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PrefixIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Collects the first path segment below `path` of every key under it.
    /// With `dirs_only`, keys sitting directly in `path` are skipped.
    fn children(&self, path: &str, dirs_only: bool) -> Vec<String> {
        let prefix = format!("{}{}", path.strip_suffix(SEPARATOR).unwrap_or(path), SEPARATOR);
        let index = self.read();
        let mut names = BTreeSet::new();
        for kv in index.scan_prefix(&prefix) {
            let mut segments = kv.key[prefix.len()..].split(SEPARATOR);
            let first = segments.next().unwrap_or_default();
            if dirs_only && segments.next().is_none() {
                continue;
            }
            if !names.contains(first) {
                names.insert(first.to_string());
            }
        }
        names.into_iter().collect()
    }
}

impl KVReader for MemStore {
    fn exists(&self, key: &str) -> bool {
        self.read().contains(key)
    }

    fn lookup(&self, key: &str) -> Option<KVPair> {
        self.read().get(key).cloned()
    }

    fn try_get_all(&self, pattern: &str) -> Result<Vec<KVPair>> {
        let pattern = Pattern::new(pattern)?;
        let index = self.read();
        Ok(index.iter().filter(|kv| pattern.matches(&kv.key)).cloned().collect())
    }

    fn get_all_kvs(&self) -> Vec<KVPair> {
        self.read().iter().cloned().collect()
    }
}

impl DirectoryLister for MemStore {
    fn list(&self, path: &str) -> Vec<String> {
        self.children(path, false)
    }

    fn list_dir(&self, path: &str) -> Vec<String> {
        self.children(path, true)
    }
}

impl KVWriter for MemStore {
    fn set(&self, key: &str, value: &str) {
        self.write().insert(key, value);
    }

    fn del(&self, key: &str) {
        self.write().remove(key);
    }

    fn purge(&self) {
        let mut index = self.write();
        log::debug!("Purging {} entries", index.len());
        *index = PrefixIndex::new();
    }
}
