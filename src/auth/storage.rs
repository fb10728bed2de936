//! Persisted session snapshot storage
//!
//! The snapshot is two keys, `token` and `user`, that are always written and
//! removed as a pair. Backends only expose pair-level writes so a caller can
//! never leave one key behind.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

const SNAPSHOT_FILENAME: &str = "session.json";

/// Durable key-value storage for the session snapshot
pub trait SnapshotStorage: Send + Sync {
    /// Read a single key
    fn get(&self, key: &str) -> Option<String>;

    /// Read `token` and `user` from one consistent view of the storage
    fn get_pair(&self) -> (Option<String>, Option<String>);

    /// Write both keys together, replacing whatever was there
    fn set_pair(&self, token: &str, user: &str) -> Result<()>;

    /// Remove both keys. Removing an absent snapshot is not an error.
    fn remove_pair(&self) -> Result<()>;
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a single raw key, bypassing pair semantics.
    ///
    /// Only for simulating a half-written snapshot.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn get_pair(&self) -> (Option<String>, Option<String>) {
        let entries = self.lock();
        (entries.get(TOKEN_KEY).cloned(), entries.get(USER_KEY).cloned())
    }

    fn set_pair(&self, token: &str, user: &str) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        entries.insert(USER_KEY.to_string(), user.to_string());
        Ok(())
    }

    fn remove_pair(&self) -> Result<()> {
        let mut entries = self.lock();
        entries.remove(TOKEN_KEY);
        entries.remove(USER_KEY);
        Ok(())
    }
}

/// Snapshot kept as a single JSON object file inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SNAPSHOT_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. Missing or malformed files read as empty.
    fn read_all(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Map::new(),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!("Ignoring unreadable session file {}", self.path.display());
                Map::new()
            }
        }
    }

    /// Replace the file contents via a temp file and rename
    fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(map)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

impl SnapshotStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all().get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn get_pair(&self) -> (Option<String>, Option<String>) {
        let map = self.read_all();
        let field = |key: &str| match map.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        (field(TOKEN_KEY), field(USER_KEY))
    }

    fn set_pair(&self, token: &str, user: &str) -> Result<()> {
        let mut map = self.read_all();
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        map.insert(USER_KEY.to_string(), Value::String(user.to_string()));
        self.write_all(&map)
    }

    fn remove_pair(&self) -> Result<()> {
        let mut map = self.read_all();
        map.remove(TOKEN_KEY);
        map.remove(USER_KEY);

        if map.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        } else {
            self.write_all(&map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_pair_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_pair("abc", "{}").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(storage.get(USER_KEY).as_deref(), Some("{}"));

        storage.remove_pair().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::new(dir.path()).set_pair("abc", "{\"x\":1}").unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(reopened.get(USER_KEY).as_deref(), Some("{\"x\":1}"));
    }

    #[test]
    fn test_file_storage_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set_pair("abc", "{}").unwrap();
        assert!(storage.path().exists());

        storage.remove_pair().unwrap();
        assert!(!storage.path().exists());
        // second removal is fine
        storage.remove_pair().unwrap();
    }

    #[test]
    fn test_file_storage_garbage_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        fs::write(storage.path(), "not json at all").unwrap();

        assert_eq!(storage.get(TOKEN_KEY), None);
        storage.set_pair("t", "u").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("t"));
    }

    #[test]
    fn test_file_storage_reads_pair_from_one_file_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_pair(), (None, None));

        storage.set_pair("abc", "{}").unwrap();
        assert_eq!(
            storage.get_pair(),
            (Some("abc".to_string()), Some("{}".to_string()))
        );

        fs::write(storage.path(), r#"{"token": "only"}"#).unwrap();
        assert_eq!(storage.get_pair(), (Some("only".to_string()), None));
    }

    #[test]
    fn test_memory_get_pair() {
        let storage = MemoryStorage::new();
        storage.insert_raw(USER_KEY, "{}");
        assert_eq!(storage.get_pair(), (None, Some("{}".to_string())));
    }
}
