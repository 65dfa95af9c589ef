use crate::error::StorageError;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key-value store holding one serialized snapshot per entity type.
///
/// A `write` replaces the whole snapshot for `key`; readers never observe a
/// half-written value.
pub trait SnapshotAdapter {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, snapshot: &str) -> Result<(), StorageError>;
    /// Keys with a stored snapshot, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
    /// Short backend name reported by `health`.
    fn kind(&self) -> &'static str;
}

/// In-process adapter for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entries: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `write` fail, as a full quota would.
    #[cfg(test)]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Stores a raw value without going through an entity store.
    #[cfg(test)]
    pub fn insert_raw(&self, key: &str, raw: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), raw.to_string());
    }
}

impl SnapshotAdapter for MemoryAdapter {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::write(key, "quota exceeded"));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), snapshot.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

/// One `<key>.json` file per snapshot under a directory.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    dir: PathBuf,
}

impl FileAdapter {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let dir = workspace.join("snapshots");
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotAdapter for FileAdapter {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::read(key, e)),
        }
    }

    fn write(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
        let dst = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.writing", key));
        let mut f = File::create(&tmp).map_err(|e| StorageError::write(key, e))?;
        f.write_all(snapshot.as_bytes())
            .and_then(|_| f.sync_all())
            .map_err(|e| StorageError::write(key, e))?;
        drop(f);
        std::fs::rename(&tmp, &dst).map_err(|e| StorageError::write(key, e))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StorageError::read("*", e))?;
        let mut keys = Vec::new();
        for ent in entries {
            let ent = ent.map_err(|e| StorageError::read("*", e))?;
            let p = ent.path();
            if !p.is_file() {
                continue;
            }
            let Some(name) = p.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(key) = name.strip_suffix(".json") {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn kind(&self) -> &'static str {
        "files"
    }
}
