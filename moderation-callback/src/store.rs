//! Persistent key-value configuration store.
//!
//! Holds the shared credentials and the replay guard's nonce record. Two
//! backends are provided: an in-memory map for tests and single-process
//! use, and a JSON file that survives restarts.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{info, warn};

use crate::error::StoreError;

/// Name under which the public (consumer) key is stored.
pub const PUBLIC_KEY: &str = "moderation_public_key";

/// Name under which the private (signing) key is stored.
pub const PRIVATE_KEY: &str = "moderation_private_key";

/// Name under which the seen-nonce record is stored.
pub const NONCES: &str = "moderation_nonces";

/// Key-value configuration store collaborator.
pub trait ConfigStore: Send + Sync {
    /// Fetch a value by name, `None` if it was never set.
    fn get(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Create or replace a value.
    fn set(&self, name: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing an absent name is not an error.
    fn delete(&self, name: &str) -> Result<(), StoreError>;
}

/// Delete every value this crate persists.
pub fn purge_module_state(store: &dyn ConfigStore) -> Result<(), StoreError> {
    for name in [PUBLIC_KEY, PRIVATE_KEY, NONCES] {
        store.delete(name)?;
    }
    info!("module_state_purged");
    Ok(())
}

/// Open the file store at `path`, or an in-memory store when there is none.
pub fn open_store(path: Option<&Path>) -> Result<Arc<dyn ConfigStore>, StoreError> {
    match path {
        Some(p) => Ok(Arc::new(JsonFileStore::open(p)?)),
        None => {
            warn!("store_in_memory_state_not_persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Process-local store, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(name);
        Ok(())
    }
}

// =============================================================================
// JSON file backend
// =============================================================================

/// Store backed by a single JSON object on disk.
///
/// The whole file is rewritten on every mutation, first to a sibling
/// temporary file and then renamed over the original, so a crash never
/// leaves a half-written store behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let raw = fs::read(&path)?;
            if raw.is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&raw)?
            }
        } else {
            warn!(path = %path.display(), "store_file_missing_starting_empty");
            BTreeMap::new()
        };

        info!(path = %path.display(), entries = values.len(), "store_opened");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(values)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        next.insert(name.to_string(), value.to_string());
        // Memory only changes once the file does
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if !values.contains_key(name) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(name);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "modcallback-store-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir.join("store.json")
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set(PUBLIC_KEY, "pub").unwrap();
        assert_eq!(store.get(PUBLIC_KEY).unwrap(), Some("pub".to_string()));

        store.delete(PUBLIC_KEY).unwrap();
        assert_eq!(store.get(PUBLIC_KEY).unwrap(), None);

        // Deleting twice is fine
        store.delete(PUBLIC_KEY).unwrap();
    }

    #[test]
    fn test_json_file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set(PRIVATE_KEY, "secret").unwrap();
            store.set(NONCES, "{}").unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get(PRIVATE_KEY).unwrap(), Some("secret".to_string()));
        assert_eq!(store.get(NONCES).unwrap(), Some("{}".to_string()));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_file_store_failed_write_leaves_memory_unchanged() {
        let path = temp_path("failed-write");
        let _ = fs::remove_file(&path);
        let tmp = path.with_extension("tmp");
        let _ = fs::remove_dir_all(&tmp);

        let store = JsonFileStore::open(&path).unwrap();
        store.set(PUBLIC_KEY, "pub").unwrap();

        // A directory in the temp file's place makes every write fail
        fs::create_dir_all(&tmp).unwrap();

        assert!(store.set(NONCES, r#"{"n":1}"#).is_err());
        assert_eq!(store.get(NONCES).unwrap(), None);

        assert!(store.delete(PUBLIC_KEY).is_err());
        assert_eq!(store.get(PUBLIC_KEY).unwrap(), Some("pub".to_string()));

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(NONCES).unwrap(), None);
        assert_eq!(reopened.get(PUBLIC_KEY).unwrap(), Some("pub".to_string()));

        fs::remove_dir_all(&tmp).unwrap();
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let path = temp_path("garbage");
        fs::write(&path, b"not json").unwrap();

        let result = JsonFileStore::open(&path);
        assert!(matches!(result, Err(StoreError::Json(_))));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_store_without_path_is_in_memory() {
        let store = open_store(None).unwrap();
        store.set(NONCES, "{}").unwrap();
        assert_eq!(store.get(NONCES).unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn test_purge_module_state() {
        let store = MemoryStore::new();
        store.set(PUBLIC_KEY, "pub").unwrap();
        store.set(PRIVATE_KEY, "priv").unwrap();
        store.set(NONCES, r#"{"abc":1}"#).unwrap();
        store.set("unrelated", "kept").unwrap();

        purge_module_state(&store).unwrap();

        assert_eq!(store.get(PUBLIC_KEY).unwrap(), None);
        assert_eq!(store.get(PRIVATE_KEY).unwrap(), None);
        assert_eq!(store.get(NONCES).unwrap(), None);
        assert_eq!(store.get("unrelated").unwrap(), Some("kept".to_string()));
    }
}
