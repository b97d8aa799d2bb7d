//! Session-scoped key-value store.
//!
//! Values are serialized JSON strings under fixed keys, one store per
//! session. Uses `DashMap` so the invalidation timer and in-flight searches
//! can touch it without a shared lock.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Key holding the serialized wildfire `CacheEntry`.
pub const FIRE_CACHE_KEY: &str = "wildfire_cache";
/// Key holding the serialized hotspot-with-distance list.
pub const HOTSPOTS_KEY: &str = "hotspots_with_distance";

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|v| v.value().clone())
    }

    pub fn set_raw(&self, key: &str, value: String) {
        self.inner.insert(key.to_string(), value);
    }

    pub fn remove(&self, key: &str) -> bool {
        self.inner.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Deserialize the value under `key`. Unreadable values read as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring unreadable session value under {}: {}", key, e);
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> common::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, raw);
        Ok(())
    }
}
