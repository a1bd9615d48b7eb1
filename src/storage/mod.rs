//! Durable key/value backing for the note collection.
//!
//! The note database is a handful of named string entries (the JSON array of
//! notes under [`NOTES_KEY`], the selected note id under [`SELECTED_KEY`]),
//! loaded wholesale and rewritten wholesale. [`KeyValueStorage`] is the seam:
//! [`MemoryStorage`] for tests, [`FileStorage`] for a project directory on disk.

mod note_store;

pub use note_store::NoteStore;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{NotewallError, Result};

pub const NOTEWALL_DIR: &str = ".notewall";
pub const NOTES_KEY: &str = "notes";
pub const SELECTED_KEY: &str = "selected";

/// A string-keyed, string-valued durable store.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage. Clones share the same map, so a clone handed to a fresh
/// `NoteStore` behaves like reopening the same database.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| NotewallError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Storage rooted at a `.notewall/` project directory, one `<key>.json` file
/// per entry.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Initialize a new notewall project under `root`.
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(NOTEWALL_DIR);

        if dir.exists() {
            return Err(NotewallError::AlreadyInitialized);
        }

        fs::create_dir_all(&dir)?;
        let storage = Self { dir };
        storage.set(NOTES_KEY, "[]")?;
        Ok(storage)
    }

    /// Open an existing notewall project under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(NOTEWALL_DIR);

        if !dir.is_dir() {
            return Err(NotewallError::NotInitialized);
        }

        Ok(Self { dir })
    }

    /// The `.notewall/` directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Write beside the target then rename so a crash never leaves half a file.
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();

        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));

        b.remove("k").unwrap();
        assert!(a.get("k").unwrap().is_none());
    }

    #[test]
    fn test_init_creates_notewall_directory() {
        let tmp = TempDir::new().unwrap();
        let _storage = FileStorage::init(tmp.path()).unwrap();

        assert!(tmp.path().join(".notewall").exists());
        assert!(tmp.path().join(".notewall/notes.json").exists());
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let tmp = TempDir::new().unwrap();
        FileStorage::init(tmp.path()).unwrap();

        let result = FileStorage::init(tmp.path());
        assert!(matches!(result, Err(NotewallError::AlreadyInitialized)));
    }

    #[test]
    fn test_open_fails_if_not_initialized() {
        let tmp = TempDir::new().unwrap();

        let result = FileStorage::open(tmp.path());
        assert!(matches!(result, Err(NotewallError::NotInitialized)));
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::init(tmp.path()).unwrap();

        storage.set("selected", "\"abc\"").unwrap();

        let reopened = FileStorage::open(tmp.path()).unwrap();
        assert_eq!(reopened.get("selected").unwrap().as_deref(), Some("\"abc\""));
        assert!(reopened.get("missing").unwrap().is_none());

        reopened.remove("selected").unwrap();
        reopened.remove("selected").unwrap();
        assert!(reopened.get("selected").unwrap().is_none());
    }
}
