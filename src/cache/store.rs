//! Cache Store Module
//!
//! TTL cache over an injected key-value backend: put/get/exists/delete with
//! expiry evaluated on every lookup. Every operation degrades to a no-op or an
//! absent view when the backend reports itself unavailable.

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::record::{self, current_timestamp, CacheView, StoredValue};
use crate::cache::{
    CacheStats, KeyValueStore, CLEAR_ALL_KEY, DEFAULT_MAX_AGE_SECS, DEFAULT_PROTECTED_KEYS,
    DEFAULT_SHAPE_MAX_AGE_SECS, MIN_MAX_AGE_SECS, MIN_READ_KEY_LENGTH,
};
use crate::error::{CodecError, StorageError};

// == Local Cache ==
/// TTL cache layered over a persistent string table.
pub struct LocalCache {
    /// Injected storage capability
    backend: Box<dyn KeyValueStore>,
    /// Performance statistics
    stats: CacheStats,
    /// Keys the `all` sentinel never removes
    protected_keys: Vec<String>,
}

impl fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCache")
            .field("stats", &self.stats)
            .field("protected_keys", &self.protected_keys)
            .finish_non_exhaustive()
    }
}

impl LocalCache {
    // == Constructor ==
    /// Creates a cache over `backend` with the default protected keys.
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            stats: CacheStats::new(),
            protected_keys: DEFAULT_PROTECTED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replaces the set of keys that survive a clear-all.
    pub fn with_protected_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    // == Availability Guard ==
    /// Probes the backend.
    pub fn availability(&self) -> Result<(), StorageError> {
        self.backend.probe()
    }

    pub fn is_available(&self) -> bool {
        self.availability().is_ok()
    }

    // == Put ==
    /// Writes `value` under `key` stamped with the current time.
    ///
    /// Overwrites unconditionally. Returns false when nothing was written,
    /// which includes a write the backend refused.
    pub fn put(&mut self, key: &str, value: impl Into<StoredValue>) -> bool {
        self.put_at(key, value.into(), current_timestamp())
    }

    pub(crate) fn put_at(&mut self, key: &str, value: StoredValue, timestamp: i64) -> bool {
        if key.is_empty() {
            return false;
        }
        if let Err(err) = self.availability() {
            debug!("Skipping write of {}: {}", key, err);
            return false;
        }

        let encoded = record::encode(&value, timestamp);
        match self.backend.set(key, encoded) {
            Ok(()) => {
                self.stats.record_write();
                true
            }
            Err(err) => {
                warn!("Cache write failed for {}: {}", key, err);
                false
            }
        }
    }

    // == Get ==
    /// Looks up `key` and evaluates its age against `max_age_secs`.
    ///
    /// A max age below the floor is treated as not provided and replaced by
    /// the default hour. Missing, malformed and unreadable entries all come
    /// back as [`CacheView::absent`]; only an `object` record with invalid
    /// JSON is an error.
    pub fn get(&mut self, key: &str, max_age_secs: i64) -> Result<CacheView, CodecError> {
        let max_age = effective_max_age(max_age_secs);

        if let Err(err) = self.availability() {
            debug!("Cache read of {} skipped: {}", key, err);
            self.stats.record_miss();
            return Ok(CacheView::absent());
        }
        if key.trim().chars().count() < MIN_READ_KEY_LENGTH {
            self.stats.record_miss();
            return Ok(CacheView::absent());
        }

        let Some(raw) = self.backend.get(key) else {
            self.stats.record_miss();
            return Ok(CacheView::absent());
        };

        let decoded = match record::decode(&raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!("Cache record {} failed to decode: {}", key, err);
                self.stats.record_miss();
                return Err(err);
            }
        };

        let view = match decoded {
            Some(rec) => CacheView::from_record(rec, max_age, current_timestamp()),
            None => CacheView::absent(),
        };

        if view.valid {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        Ok(view)
    }

    // == Exists ==
    /// Exact key membership, or with `fuzzy` any key starting with `key`
    /// ignoring case.
    pub fn exists(&self, key: &str, fuzzy: bool) -> bool {
        if self.availability().is_err() {
            return false;
        }
        if fuzzy {
            let needle = key.to_lowercase();
            self.backend
                .keys()
                .iter()
                .any(|k| k.to_lowercase().starts_with(&needle))
        } else {
            self.backend.get(key).is_some()
        }
    }

    // == Delete ==
    /// Deletes `key`, every key prefixed by `key` when `fuzzy`, or every
    /// unprotected key for the `all` sentinel.
    ///
    /// Returns whether anything was deleted.
    pub fn delete(&mut self, key: &str, fuzzy: bool) -> bool {
        if let Err(err) = self.availability() {
            debug!("Cache delete of {} skipped: {}", key, err);
            return false;
        }

        if key == CLEAR_ALL_KEY {
            let targets: Vec<String> = self
                .backend
                .keys()
                .into_iter()
                .filter(|k| !self.protected_keys.contains(k))
                .collect();
            return self.remove_keys(&targets) > 0;
        }
        if key.is_empty() {
            return false;
        }

        if fuzzy {
            let targets = self.keys_with_prefix(key);
            self.remove_keys(&targets) > 0
        } else {
            self.remove_key(key)
        }
    }

    // == Exists With Shape ==
    /// True if `key` holds a fresh object record carrying every field in
    /// `required_fields`.
    ///
    /// `max_age_secs` defaults to a week.
    pub fn exists_with_shape(
        &mut self,
        key: &str,
        required_fields: &[&str],
        max_age_secs: Option<i64>,
    ) -> bool {
        if !self.exists(key, false) {
            return false;
        }
        let max_age = max_age_secs.unwrap_or(DEFAULT_SHAPE_MAX_AGE_SECS);
        let Ok(view) = self.get(key, max_age) else {
            return false;
        };
        match view.fresh_value() {
            Some(StoredValue::Object(Value::Object(map))) => {
                required_fields.iter().all(|field| map.contains_key(*field))
            }
            Some(StoredValue::Object(_)) => required_fields.is_empty(),
            _ => false,
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        let total = if self.is_available() {
            self.backend.keys().len()
        } else {
            0
        };
        stats.set_total_entries(total);
        stats
    }

    // == Backend Helpers ==
    /// The raw encoded record under `key`.
    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        self.backend.get(key)
    }

    /// Keys starting with `prefix`, case-sensitive.
    pub(crate) fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.backend
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect()
    }

    pub(crate) fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    /// Removes one key, logging backend failures. Returns whether it existed.
    pub(crate) fn remove_key(&mut self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(removed) => removed,
            Err(err) => {
                warn!("Cache delete failed for {}: {}", key, err);
                false
            }
        }
    }

    fn remove_keys(&mut self, keys: &[String]) -> usize {
        keys.iter().filter(|k| self.remove_key(k)).count()
    }
}

/// Applies the max-age floor.
pub fn effective_max_age(max_age_secs: i64) -> i64 {
    if max_age_secs < MIN_MAX_AGE_SECS {
        DEFAULT_MAX_AGE_SECS
    } else {
        max_age_secs
    }
}
