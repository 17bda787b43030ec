//! JSON-file storage backend.
//!
//! The whole map is kept in one JSON object (`{"token": "...", "user": "..."}`)
//! and rewritten through a temp file + rename on every mutation, so a crash
//! mid-write never leaves a truncated store behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use super::{StorageBackend, StoreError};

/// Default size limit, mirroring a browser's per-origin storage quota.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    quota_bytes: u64,
    /// Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_quota(path, DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(path: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self {
            path: path.into(),
            quota_bytes,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                StoreError::Corrupt(format!("{}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::from_io(e)),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if data.len() as u64 > self.quota_bytes {
            return Err(StoreError::QuotaExceeded(format!(
                "{} bytes exceeds quota of {} bytes",
                data.len(),
                self.quota_bytes
            )));
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(StoreError::from_io)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(StoreError::from_io)?;
        tmp.write_all(&data).map_err(StoreError::from_io)?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::from_io(e.error))?;
        Ok(())
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        if f(&mut entries) {
            self.save(&entries)?;
        }
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
