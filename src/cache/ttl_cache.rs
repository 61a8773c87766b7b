//! TTL cache over a persisted store
//!
//! Entries carry an absolute expiry timestamp. Expiry is lazy: an entry whose
//! `expires_at` is not after the lookup time is removed by the lookup that
//! observes it, and nothing sweeps the store in the background.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::CacheStore;

/// Errors from writing cache entries
///
/// Reads never fail: anything unreadable is reported as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("TTL out of range: {0:?}")]
    TtlOutOfRange(Duration),
}

/// Entry as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub key: String,
    pub payload: T,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Persisted key-value cache with per-entry TTL
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

impl TtlCache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Returns the fresh payload for `key`, if any
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        self.get_entry_at(key, now).map(|entry| entry.payload)
    }

    /// Like [`get_at`](Self::get_at) but keeps the entry metadata
    pub fn get_entry_at<T: DeserializeOwned>(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<CacheEntry<T>> {
        let raw = match self.store.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Cache read failed for {:?}, treating as miss: {}", key, e);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Corrupt cache entry {:?}, treating as miss: {}", key, e);
                return None;
            }
        };

        if entry.key != key {
            log::warn!("Cache entry for {:?} holds key {:?}, treating as miss", key, entry.key);
            return None;
        }

        if entry.is_expired_at(now) {
            log::debug!("Cache entry {:?} expired at {}", key, entry.expires_at);
            if let Err(e) = self.store.remove(key) {
                log::warn!("Failed to evict expired cache entry {:?}: {}", key, e);
            }
            return None;
        }

        Some(entry)
    }

    /// Writes `payload` under `key`, replacing any previous entry
    pub fn set<T: Serialize>(&self, key: &str, payload: &T, ttl: Duration) -> Result<(), CacheError> {
        self.set_at(key, payload, ttl, Utc::now())
    }

    pub fn set_at<T: Serialize>(
        &self,
        key: &str,
        payload: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let ttl_delta =
            chrono::Duration::from_std(ttl).map_err(|_| CacheError::TtlOutOfRange(ttl))?;
        let expires_at = now
            .checked_add_signed(ttl_delta)
            .ok_or(CacheError::TtlOutOfRange(ttl))?;

        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            cached_at: now,
            expires_at,
        };

        let json = serde_json::to_string(&entry)?;
        self.store.write(key, &json)?;
        log::debug!("Cached {:?} until {}", key, expires_at);
        Ok(())
    }

    /// Removes `key` regardless of freshness
    pub fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            log::warn!("Failed to invalidate cache entry {:?}: {}", key, e);
        }
    }

    /// Removes every entry in the store
    pub fn clear(&self) -> Result<(), CacheError> {
        self.store.clear()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "ttl_cache_tests.rs"]
mod ttl_cache_tests;
