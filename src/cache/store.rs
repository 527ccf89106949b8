//! Expiring Store Module
//!
//! File-backed key-value store with lazy, read-time TTL expiration.
//!
//! The backing file is opened, read or replaced, and closed within every
//! operation; nothing is held between calls. Writes go to a temporary file
//! in the same directory which is then renamed over the store, so a crash
//! mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::cache::{CacheEntry, Clock, SystemClock, Ttl};
use crate::error::{CacheError, Result};

// == Store File ==
/// On-disk layout of a store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, CacheEntry>,
}

// == Expiring Store ==
/// Persistent store of opaque values with a single expiration policy.
///
/// Expired entries are reported as missing but stay on disk until they are
/// overwritten or removed.
#[derive(Debug)]
pub struct ExpiringStore<C: Clock = SystemClock> {
    /// Backing file
    path: PathBuf,
    /// Expiration policy
    ttl: Ttl,
    /// Time source for stamping and aging entries
    clock: C,
}

impl ExpiringStore<SystemClock> {
    // == Open ==
    /// Opens the store at `path`, with a TTL expression such as `3Y`.
    ///
    /// The expression is validated before the file system is touched.
    pub fn open(path: impl Into<PathBuf>, ttl_expression: &str) -> Result<Self> {
        let ttl = Ttl::parse(ttl_expression)?;
        Self::with_clock(path, ttl, SystemClock)
    }
}

impl<C: Clock> ExpiringStore<C> {
    // == Constructor ==
    /// Opens the store at `path`, creating parent directories and an empty
    /// store when the file does not exist yet.
    pub fn with_clock(path: impl Into<PathBuf>, ttl: Ttl, clock: C) -> Result<Self> {
        let store = Self {
            path: path.into(),
            ttl,
            clock,
        };
        store.ensure_exists()?;
        debug!(path = %store.path.display(), ttl = %store.ttl, "Cache store opened");
        Ok(store)
    }

    // == Path ==
    /// Returns the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == TTL ==
    /// Returns the expiration policy.
    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous entry.
    pub fn put<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        let payload = serde_json::to_value(value)
            .map_err(|e| CacheError::StorageWrite(format!("cannot serialize {}: {}", key, e)))?;
        let entry = CacheEntry::new(payload, self.clock.now());

        let mut file = self.load().map_err(into_write_error)?;
        file.entries.insert(key.to_string(), entry);
        self.persist(&file)?;

        debug!(key, path = %self.path.display(), "Cache entry stored");
        Ok(())
    }

    // == Get ==
    /// Retrieves the value under `key` if present and not expired.
    ///
    /// Absent and expired keys both yield `CacheError::NotFound`.
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Result<V> {
        let mut file = self.load()?;
        let entry = file
            .entries
            .remove(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        if !entry.is_fresh(self.ttl, self.clock.now()) {
            debug!(key, stored_at = %entry.stored_at, "Cache entry expired");
            return Err(CacheError::NotFound(key.to_string()));
        }

        debug!(key, "Found in cache");
        serde_json::from_value(entry.payload)
            .map_err(|e| CacheError::StorageRead(format!("cannot decode {}: {}", key, e)))
    }

    // == Remove ==
    /// Deletes the entry under `key`. Returns whether one existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut file = self.load().map_err(into_write_error)?;
        if file.entries.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&file)?;
        debug!(key, "Cache entry removed");
        Ok(true)
    }

    // == Contains ==
    /// Returns whether an entry exists under `key`, expired or not.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.load()?.entries.contains_key(key))
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.entries.len())
    }

    // == Is Empty ==
    /// Returns whether the store holds no entries, expired ones included.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // == Expiration Time ==
    /// Returns when the entry under `key` stops being served.
    pub fn expiration_time(&self, key: &str) -> Result<DateTime<Utc>> {
        self.load()?
            .entries
            .get(key)
            .map(|entry| entry.expires_at(self.ttl))
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn ensure_exists(&self) -> Result<()> {
        let unavailable = |source: std::io::Error| CacheError::StorageUnavailable {
            path: self.path.clone(),
            source,
        };

        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => {
                fs::File::open(&self.path).map_err(unavailable)?;
                return Ok(());
            }
            Ok(_) => {
                return Err(unavailable(std::io::Error::new(
                    ErrorKind::InvalidInput,
                    "not a regular file",
                )))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(unavailable(e)),
        }

        if let Some(parent) = self.parent_dir() {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }
        let empty = serde_json::to_vec(&StoreFile::default())
            .map_err(|e| unavailable(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        fs::write(&self.path, empty).map_err(unavailable)?;

        info!(path = %self.path.display(), "Created cache store");
        Ok(())
    }

    fn load(&self) -> Result<StoreFile> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            // Removed behind our back: behave as an empty store.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(e) => {
                return Err(CacheError::StorageRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            CacheError::StorageRead(format!("{} is corrupt: {}", self.path.display(), e))
        })
    }

    fn persist(&self, file: &StoreFile) -> Result<()> {
        let bytes = serde_json::to_vec(file).map_err(|e| self.write_error(e))?;

        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(&bytes).map_err(|e| self.write_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_error(e.error))?;
        Ok(())
    }

    fn write_error(&self, err: impl std::fmt::Display) -> CacheError {
        CacheError::StorageWrite(format!("{}: {}", self.path.display(), err))
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

fn into_write_error(err: CacheError) -> CacheError {
    match err {
        CacheError::StorageRead(msg) => CacheError::StorageWrite(msg),
        other => other,
    }
}
