use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;

use crate::{KVWriter, Result};

/// Reads key/value data from a JSON file.
///
/// The file holds one flat object mapping keys to scalar values:
///
/// ```json
/// { "/app/db/user": "admin", "/app/port": 443 }
/// ```
///
/// The file is only ever read; the store never writes back to it.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every pair from the file.
    ///
    /// Numbers and booleans are stored in their JSON text form. `null`,
    /// arrays and objects have no string form and are skipped.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        let content = fs::read(&self.path)?;
        let raw: BTreeMap<String, Value> = serde_json::from_slice(&content)?;

        let mut pairs = BTreeMap::new();
        for (key, value) in raw {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    warn!("Skipping key {} in {:?}: unsupported value {}", key, self.path, other);
                    continue;
                }
            };
            pairs.insert(key, value);
        }
        Ok(pairs)
    }

    /// Replaces the contents of `store` with the pairs in the file.
    ///
    /// The file is parsed before the store is touched, so a bad file leaves
    /// the store as it was. Returns the number of pairs written.
    pub fn sync(&self, store: &dyn KVWriter) -> Result<usize> {
        let pairs = self.load()?;
        store.purge();
        for (key, value) in &pairs {
            store.set(key, value);
        }
        debug!("Loaded {} pairs from {:?}", pairs.len(), self.path);
        Ok(pairs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemStore;
    use crate::{Error, KVPair, KVReader};
    use tempfile::tempdir;

    #[test]
    fn test_load_scalars() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.json");
        fs::write(
            &file_path,
            r#"{
  "/app/db/user": "admin",
  "/app/port": 443,
  "/app/debug": false,
  "/app/none": null,
  "/app/list": [1, 2]
}"#,
        )
        .unwrap();

        let loaded = FileSource::new(&file_path).load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get("/app/db/user").unwrap(), "admin");
        assert_eq!(loaded.get("/app/port").unwrap(), "443");
        assert_eq!(loaded.get("/app/debug").unwrap(), "false");
    }

    #[test]
    fn test_sync_replaces_store() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.json");
        fs::write(&file_path, r#"{"/app/port": "8080"}"#).unwrap();

        let store = MemStore::from_pairs([("/stale", "x")]);
        let count = FileSource::new(&file_path).sync(&store).unwrap();

        assert_eq!(count, 1);
        assert!(!store.exists("/stale"));
        assert_eq!(store.get("/app/port"), KVPair::new("/app/port", "8080"));
    }

    #[test]
    fn test_bad_file_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("data.json");
        fs::write(&file_path, "not json").unwrap();

        let store = MemStore::from_pairs([("/keep", "x")]);
        let res = FileSource::new(&file_path).sync(&store);

        assert!(matches!(res, Err(Error::Serialization(_))));
        assert!(store.exists("/keep"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let res = FileSource::new(dir.path().join("absent.json")).load();
        assert!(matches!(res, Err(Error::Io(_))));
    }
}
