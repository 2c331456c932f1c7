//! Key/value stores backing the repository

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{FdError, FdResult};

/// Whole-value key/value persistence.
///
/// `set` replaces the value for a key; `get` returns the last value
/// successfully written, or `None`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> FdResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> FdResult<()>;
    fn remove(&mut self, key: &str) -> FdResult<()>;
}

/// In-process store, nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> FdResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> FdResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> FdResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a randomly named temporary sibling first and are
/// persisted over the target, so readers see the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> FdResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> FdResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FdError::Storage(format!("invalid key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> FdResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> FdResult<()> {
        let path = self.path_for(key)?;

        // Random temp name in the same directory so concurrent writers
        // never share a half-written file.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.as_file_mut().write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        log::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> FdResult<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("smart_fd_investments").unwrap(), None);
        store.set("smart_fd_investments", "[]").unwrap();
        assert_eq!(store.get("smart_fd_investments").unwrap().as_deref(), Some("[]"));
        let names: Vec<_> = fs::read_dir(dir.path().join("data"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["smart_fd_investments.json"]);

        // Survives reopening
        let reopened = FileStore::open(dir.path().join("data")).unwrap();
        assert_eq!(reopened.get("smart_fd_investments").unwrap().as_deref(), Some("[]"));

        store.remove("smart_fd_investments").unwrap();
        store.remove("smart_fd_investments").unwrap();
        assert_eq!(store.get("smart_fd_investments").unwrap(), None);
    }

    #[test]
    fn test_concurrent_writers_leave_a_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let root = root.clone();
                std::thread::spawn(move || {
                    let mut store = FileStore::open(&root).unwrap();
                    for i in 0..25 {
                        let value = serde_json::to_string(&vec![w * 100 + i; 500]).unwrap();
                        store.set("smart_fd_investments", &value).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = FileStore::open(&root).unwrap();
        let raw = store.get("smart_fd_investments").unwrap().unwrap();
        let values: Vec<u32> = serde_json::from_str(&raw).unwrap();
        assert_eq!(values.len(), 500);
        assert!(values.iter().all(|v| *v == values[0]));
        assert_eq!(fs::read_dir(&root).unwrap().count(), 1);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(store.set("../escape", "x"), Err(FdError::Storage(_))));
        assert!(store.get("").is_err());
    }
}
