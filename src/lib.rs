//! memkv is an in-memory key/value store for hierarchical, slash-delimited keys.
//!
//! Besides exact lookups it answers shell-glob queries (`/app/*/host1`) and
//! directory-style listings (`ls /app`), which makes it a good data source for
//! configuration templates.
//!
//! ## Core Components
//! - [`engine`]: The prefix-ordered index, the glob matcher and [`engine::MemStore`].
//! - [`template`]: The name-keyed function table handed to a template renderer.

pub mod engine;
pub mod template;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by memkv.
#[derive(Error, Debug)]
pub enum Error {
    /// A glob pattern is syntactically invalid.
    #[error("syntax error in pattern")]
    BadPattern,
    /// No template function is registered under the name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// A template function was called with the wrong number of arguments.
    #[error("{name}: expected {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },
    /// A template function argument has the wrong type.
    #[error("{name}: argument {index} must be a string")]
    ArgumentType { name: String, index: usize },
    /// An I/O error occurred while reading a data source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for memkv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A key and the value stored under it.
///
/// The zero value (`KVPair::default()`) doubles as the "not found" result of
/// [`KVReader::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KVPair {
    pub key: String,
    pub value: String,
}

impl KVPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns `true` for the "not found" sentinel.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Defines point and pattern read operations for the store.
pub trait KVReader: Send + Sync {
    /// Reports whether an entry is stored under `key`.
    fn exists(&self, key: &str) -> bool;

    /// Returns the entry for `key`, or `None` if it is absent.
    fn lookup(&self, key: &str) -> Option<KVPair>;

    /// Returns the entry for `key`, or the empty sentinel if it is absent.
    ///
    /// A stored empty key cannot be told apart from a missing one; use
    /// [`KVReader::lookup`] when that matters.
    fn get(&self, key: &str) -> KVPair {
        self.lookup(key).unwrap_or_default()
    }

    /// Returns the value for `key`, or `default` (empty if `None`) when absent.
    fn get_value(&self, key: &str, default: Option<&str>) -> String {
        let kv = self.get(key);
        if kv.is_empty() {
            return default.unwrap_or_default().to_string();
        }
        kv.value
    }

    /// Returns every entry whose key matches the glob `pattern`, in key order.
    fn try_get_all(&self, pattern: &str) -> Result<Vec<KVPair>>;

    /// Like [`KVReader::try_get_all`], but a malformed pattern yields an empty
    /// result instead of an error.
    fn get_all(&self, pattern: &str) -> Vec<KVPair> {
        match self.try_get_all(pattern) {
            Ok(kvs) => kvs,
            Err(e) => {
                log::warn!("Discarding results for pattern {:?}: {}", pattern, e);
                Vec::new()
            }
        }
    }

    /// Returns the values of [`KVReader::get_all`], sorted by value.
    fn get_all_values(&self, pattern: &str) -> Vec<String> {
        let mut values: Vec<String> = self.get_all(pattern).into_iter().map(|kv| kv.value).collect();
        values.sort();
        values
    }

    /// Returns every entry in the store, in key order.
    fn get_all_kvs(&self) -> Vec<KVPair>;
}

/// Treats slash-delimited keys as a virtual filesystem.
pub trait DirectoryLister: Send + Sync {
    /// Lists the immediate children of `path`, files and directories alike.
    fn list(&self, path: &str) -> Vec<String>;
    /// Lists only the children of `path` that have keys nested beneath them.
    fn list_dir(&self, path: &str) -> Vec<String>;
}

/// Defines write, delete and reset operations for the store.
pub trait KVWriter: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);
    /// Removes `key`. Removing an absent key is a no-op.
    fn del(&self, key: &str);
    /// Discards every entry.
    fn purge(&self);
}

/// The complete store interface.
pub trait Store: KVReader + DirectoryLister + KVWriter {}

impl<T: KVReader + DirectoryLister + KVWriter> Store for T {}
