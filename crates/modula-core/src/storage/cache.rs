//! Key-value cache with expiry, used to keep discovery results between runs.
//!
//! A `ttl` of [`Duration::ZERO`] stores the value without expiry.
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;
use crate::storage::StorageProvider;

/// Key-value cache collaborator
pub trait CacheStore: Send + Sync + Debug {
    /// Get a live (non-expired) value
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value for `ttl`
    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Drop a value; returns whether anything was stored under `key`
    fn forget(&self, key: &str) -> Result<bool>;

    /// Return the cached value or compute, store and return it
    fn remember(
        &self,
        key: &str,
        ttl: Duration,
        compute: &mut dyn FnMut() -> Result<String>,
    ) -> Result<String> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        self.put(key, &value, ttl)?;
        Ok(value)
    }
}

/// Process-local cache
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, as the manager expects
    pub fn shared() -> Arc<dyn CacheStore> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, Option<Instant>)>> {
        // A poisoned map still holds valid entries
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((_, Some(expires))) if *expires <= Instant::now() => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        // A ttl past the clock's range never expires
        let expires = if ttl.is_zero() { None } else { Instant::now().checked_add(ttl) };
        self.lock().insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedFile {
    /// Seconds since the Unix epoch; `None` never expires
    expires_at: Option<u64>,
    value: String,
}

/// Cache persisted as one JSON file per key under `directory`
#[derive(Debug)]
pub struct FileCacheStore {
    provider: Arc<dyn StorageProvider>,
    directory: PathBuf,
}

impl FileCacheStore {
    pub fn new(provider: Arc<dyn StorageProvider>, directory: PathBuf) -> Self {
        Self { provider, directory }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.directory.join(format!("{}.json", file_name))
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        if !self.provider.is_file(&path) {
            return None;
        }
        let raw = match self.provider.read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Failed to read cache entry '{}': {}", key, e);
                return None;
            }
        };
        let cached: CachedFile = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                log::warn!("Discarding unreadable cache entry '{}': {}", key, e);
                return None;
            }
        };
        match cached.expires_at {
            Some(expires) if expires <= Self::now_secs() => {
                log::debug!("Cache entry '{}' expired", key);
                None
            }
            _ => Some(cached.value),
        }
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let cached = CachedFile {
            expires_at: if ttl.is_zero() {
                None
            } else {
                Self::now_secs().checked_add(ttl.as_secs().max(1))
            },
            value: value.to_string(),
        };
        let encoded = serde_json::to_string(&cached)
            .map_err(|e| StorageSystemError::serialization("json", e))?;
        self.provider.write_string(&self.entry_path(key), &encoded)
    }

    fn forget(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);
        if !self.provider.exists(&path) {
            return Ok(false);
        }
        self.provider.remove_file(&path)?;
        Ok(true)
    }
}
