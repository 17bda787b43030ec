// @awa-component: STORE-ClientStore
//
//! Client store: persistent key-value storage with an in-memory fallback.
//!
//! The persistent backend is chosen once, when the store is built. When it
//! refuses a write (blocked, quota, I/O) the value lands in the in-memory map
//! instead and the caller gets [`Stored::MemoryOnly`] back, so it can warn
//! that the value will not outlive the process. Nothing here panics or
//! returns an error to the caller.
//!
//! The two layers are never reconciled: a value written to memory while the
//! backend was blocked stays in memory only. Reads check memory first, and a
//! write that lands in memory drops the older persistent copy when it can, so
//! the last write always wins.

pub mod file;
pub mod memory;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use thiserror::Error;

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON-serialised current user.
pub const USER_KEY: &str = "user";

/// Key written and removed by the availability check.
const SENTINEL_KEY: &str = "__storage_test__";

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage blocked: {0}")]
    Blocked(String),

    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Storage data corrupt: {0}")]
    Corrupt(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Classify an I/O error the way a browser classifies storage exceptions.
    pub fn from_io(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                StoreError::Blocked(e.to_string())
            }
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => {
                StoreError::QuotaExceeded(e.to_string())
            }
            _ => StoreError::Io(e),
        }
    }
}

/// A persistent key-value backend.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Human-readable description for log lines.
    fn describe(&self) -> String;
}

/// Where a `set_item` call put the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stored {
    /// Written to the persistent backend.
    Persistent,
    /// Backend refused the write; the value only lives for this process.
    MemoryOnly,
}

impl Stored {
    pub fn is_durable(self) -> bool {
        matches!(self, Stored::Persistent)
    }
}

/// Anything that can hand out the current bearer token.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Persistent-with-fallback key-value store shared by the whole client.
pub struct ClientStore {
    persistent: Option<Box<dyn StorageBackend>>,
    memory: MemoryBackend,
    /// Sticky once any non-quota failure is seen.
    blocked: AtomicBool,
}

impl ClientStore {
    /// Build a store over `backend`, probing it once up front.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        let store = Self {
            persistent: Some(Box::new(backend)),
            memory: MemoryBackend::new(),
            blocked: AtomicBool::new(false),
        };
        if store.is_available() {
            debug!("client store using {}", store.describe());
        } else {
            warn!(
                "persistent storage unavailable ({}), using session-only memory",
                store.describe()
            );
        }
        store
    }

    /// Store backed by a JSON file at `path`.
    pub fn open(path: impl Into<PathBuf>, quota_bytes: u64) -> Self {
        Self::new(FileBackend::with_quota(path, quota_bytes))
    }

    /// Store with no persistent layer at all.
    pub fn memory_only() -> Self {
        Self {
            persistent: None,
            memory: MemoryBackend::new(),
            blocked: AtomicBool::new(true),
        }
    }

    pub fn describe(&self) -> String {
        match &self.persistent {
            Some(backend) => backend.describe(),
            None => "memory".to_string(),
        }
    }

    /// Backend to use right now, if any.
    fn usable(&self) -> Option<&dyn StorageBackend> {
        if self.blocked.load(Ordering::Acquire) {
            return None;
        }
        self.persistent.as_deref()
    }

    /// React to a backend failure. Quota errors leave the backend usable.
    fn degrade(&self, op: &str, key: &str, err: &StoreError) {
        match err {
            StoreError::QuotaExceeded(_) => {
                warn!("storage {op} of '{key}' hit quota, keeping value in memory: {err}");
            }
            _ => {
                if !self.blocked.swap(true, Ordering::AcqRel) {
                    warn!("storage {op} of '{key}' failed, switching to memory: {err}");
                }
            }
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        if let Some(value) = self.memory.read(key) {
            return Some(value);
        }
        let backend = self.usable()?;
        match backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                self.degrade("read", key, &e);
                None
            }
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Stored {
        if let Some(backend) = self.usable() {
            match backend.set(key, value) {
                Ok(()) => {
                    self.memory.delete(key);
                    return Stored::Persistent;
                }
                Err(e) => {
                    self.degrade("write", key, &e);
                    // Quota leaves the backend usable; drop the stale copy.
                    if let Some(backend) = self.usable()
                        && let Err(e) = backend.remove(key)
                    {
                        self.degrade("remove", key, &e);
                    }
                }
            }
        }
        self.memory.write(key, value);
        Stored::MemoryOnly
    }

    /// Remove `key` from both layers. Returns `false` when the persistent
    /// copy could not be removed.
    pub fn remove_item(&self, key: &str) -> bool {
        self.memory.delete(key);
        match self.usable() {
            Some(backend) => match backend.remove(key) {
                Ok(()) => true,
                Err(e) => {
                    self.degrade("remove", key, &e);
                    false
                }
            },
            None => true,
        }
    }

    /// Probe the backend with a sentinel write. A quota error still counts
    /// as available.
    pub fn is_available(&self) -> bool {
        let Some(backend) = self.usable() else {
            return false;
        };
        let check = backend
            .set(SENTINEL_KEY, SENTINEL_KEY)
            .and_then(|()| backend.remove(SENTINEL_KEY));
        match check {
            Ok(()) => true,
            Err(e @ StoreError::QuotaExceeded(_)) => {
                debug!("storage check hit quota: {e}");
                true
            }
            Err(e) => {
                self.degrade("check", SENTINEL_KEY, &e);
                false
            }
        }
    }

    pub fn is_blocked(&self) -> bool {
        !self.is_available()
    }
}

impl TokenSource for ClientStore {
    fn token(&self) -> Option<String> {
        self.get_item(TOKEN_KEY)
    }
}
