//! Durable client storage.
//!
//! A small key-value store that survives restarts. The session keeps its
//! bearer token and user record here.

use crate::consts::cli_consts::storage::{STORAGE_DIR, STORAGE_FILE};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a valid key-value map.
    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The home directory could not be determined.
    #[error("Unable to determine home directory")]
    NoHomeDir,
}

/// Persistent key-value storage local to the running client.
pub trait Storage: Send + Sync {
    /// Read a single value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write all entries as one record. Either every entry lands or none does.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove the given keys. Missing keys are ignored.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Default location of the storage file: `$HOME/.cloudops/storage.json`.
pub fn default_storage_path() -> Result<PathBuf, StorageError> {
    let home = home::home_dir().ok_or(StorageError::NoHomeDir)?;
    Ok(home.join(STORAGE_DIR).join(STORAGE_FILE))
}

/// JSON-file backed storage.
///
/// Every write replaces the whole file through a temporary file and a rename,
/// so a crash leaves either the old or the new record on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(buf) if buf.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(buf) => Ok(serde_json::from_slice(&buf)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T, StorageError>) -> Result<T, StorageError> {
        // A poisoned lock only means another writer panicked; the file itself
        // is still whole because writes go through a rename.
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_lock(|| Ok(self.load()?.remove(key)))
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.with_lock(|| {
            let mut map = match self.load() {
                Ok(map) => map,
                // A corrupt file is replaced rather than blocking a fresh login.
                Err(StorageError::Corrupt(_)) => BTreeMap::new(),
                Err(e) => return Err(e),
            };
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
            self.save(&map)
        })
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.with_lock(|| {
            let mut map = match self.load() {
                Ok(map) => map,
                // Nothing worth keeping in a corrupt file.
                Err(StorageError::Corrupt(_)) => BTreeMap::new(),
                Err(e) => return Err(e),
            };
            for key in keys {
                map.remove(*key);
            }
            self.save(&map)
        })
    }
}

/// In-memory storage for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let storage = Self::default();
        storage.set_all(entries).unwrap();
        storage
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries.lock().unwrap();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.entries.lock().unwrap();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    // Values written together should be readable after reopening the file.
    fn test_set_all_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::new(&path);
        storage
            .set_all(&[("auth_token", "tok"), ("user", "{\"id\":\"1\"}")])
            .unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("tok"));
        assert_eq!(
            reopened.get("user").unwrap().as_deref(),
            Some("{\"id\":\"1\"}")
        );
    }

    #[test]
    // Saving should create directories if they don't exist.
    fn test_set_all_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("storage.json");

        let storage = FileStorage::new(&path);
        storage.set_all(&[("auth_token", "tok")]).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get("auth_token").unwrap(), None);
    }

    #[test]
    fn test_remove_all_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        storage
            .set_all(&[("auth_token", "tok"), ("user", "u"), ("theme", "dark")])
            .unwrap();

        storage.remove_all(&["auth_token", "user"]).unwrap();

        assert_eq!(storage.get("auth_token").unwrap(), None);
        assert_eq!(storage.get("user").unwrap(), None);
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    // Reading a corrupt file should fail, but clearing it should recover.
    fn test_corrupt_file_is_reported_and_clearable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("auth_token"),
            Err(StorageError::Corrupt(_))
        ));

        storage.remove_all(&["auth_token", "user"]).unwrap();
        assert_eq!(storage.get("auth_token").unwrap(), None);
    }

    #[test]
    // A corrupt file is overwritten by the next write.
    fn test_set_all_replaces_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        storage.set_all(&[("auth_token", "tok")]).unwrap();

        assert_eq!(storage.get("auth_token").unwrap().as_deref(), Some("tok"));
    }

    #[test]
    // An unreadable file must fail the write before anything is staged.
    fn test_set_all_propagates_read_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::create_dir(&path).unwrap();

        let storage = FileStorage::new(&path);
        let result = storage.set_all(&[("auth_token", "tok")]);

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
