//! Backing stores for the TTL cache
//!
//! A store is a flat string-to-string map. `FileStore` keeps one JSON file per
//! key under a directory; `MemoryStore` keeps everything in a shared map.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

/// Raw persisted key-value storage used by [`TtlCache`](super::TtlCache)
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written or was removed
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Stores each entry as `<dir>/<sha256(key)>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`
    ///
    /// Keys are arbitrary text of any length (endpoint URLs plus queries), so
    /// the name is a fixed-length digest. The full key is kept inside the entry.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{:x}.json", digest))
    }
}

impl CacheStore for FileStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn clear(&self) -> io::Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Writes a raw value, bypassing entry encoding (used to simulate corruption)
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still structurally valid
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_read_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.read("missing").unwrap(), None);
    }

    #[test]
    fn test_file_store_write_creates_nested_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::new(&nested);

        store.write("key", "value").unwrap();

        assert!(nested.exists());
        assert_eq!(store.read("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_store_encodes_unsafe_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let key = "https://example.com/search?q=a/b c";

        store.write(key, "payload").unwrap();

        let path = store.path_for(key);
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.exists());
        assert_eq!(store.read(key).unwrap().as_deref(), Some("payload"));
    }

    #[test]
    fn test_file_store_long_key_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let key = format!("https://api.example.com/search?q=:{}", "x".repeat(600));

        store.write(&key, "payload").unwrap();

        let name = store.path_for(&key);
        assert_eq!(name.file_name().unwrap().len(), 64 + ".json".len());
        assert_eq!(store.read(&key).unwrap().as_deref(), Some("payload"));
        store.remove(&key).unwrap();
        assert_eq!(store.read(&key).unwrap(), None);
    }

    #[test]
    fn test_file_store_distinct_keys_get_distinct_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert_ne!(store.path_for("crates:serde"), store.path_for("crates:serde "));
        assert_eq!(store.path_for("crates:serde"), store.path_for("crates:serde"));
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.remove("never-written").is_ok());
    }

    #[test]
    fn test_file_store_clear_only_removes_json_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.write("one", "1").unwrap();
        store.write("two", "2").unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        store.clear().unwrap();

        assert_eq!(store.read("one").unwrap(), None);
        assert_eq!(store.read("two").unwrap(), None);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_file_store_clear_missing_dir_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));

        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.write("k", "v").unwrap();

        assert!(clone.contains("k"));
        assert_eq!(clone.len(), 1);
        clone.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
