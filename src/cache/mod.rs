//! Cache Module
//!
//! Local caching over a size-constrained persistent string table, with TTL
//! expiry, type-tagged records and byte-budget eviction per key prefix.

mod backend;
mod eviction;
pub mod record;
mod stats;
mod store;


// Re-export public types
pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use eviction::{target_keep_count, EvictionReport, ScanResult, StoredItemMeta};
pub use record::{CacheView, Record, StoredValue, ValueKind};
pub use stats::CacheStats;
pub use store::{effective_max_age, LocalCache};

// == Public Constants ==
/// Max age used when a caller passes less than [`MIN_MAX_AGE_SECS`]
pub const DEFAULT_MAX_AGE_SECS: i64 = 60 * 60;

/// Smallest max age honoured as given
pub const MIN_MAX_AGE_SECS: i64 = 5;

/// Default max age for shape checks
pub const DEFAULT_SHAPE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Keys shorter than this (after trimming) always read as absent
pub const MIN_READ_KEY_LENGTH: usize = 2;

/// Sentinel key that clears every unprotected entry
pub const CLEAR_ALL_KEY: &str = "all";

/// Keys that survive a clear-all
pub const DEFAULT_PROTECTED_KEYS: &[&str] = &["current-user"];
