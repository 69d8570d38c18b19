//! Prefix Scan and Eviction Module
//!
//! Enumerates the entries of a namespace and trims it back under a byte
//! budget by dropping the oldest entries.
//!
//! Eviction is proportional by count: with `n` entries totalling `B` bytes
//! and a budget `b`, the `floor(n * b / B)` most recent entries are kept.
//! When that keep count is 1 or less nothing is removed, so a namespace
//! holding a few very large entries can stay over budget.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::record::leading_timestamp;
use crate::cache::LocalCache;

// == Stored Item Meta ==
/// One entry found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredItemMeta {
    pub key: String,
    /// Write time, Unix seconds
    pub timestamp: i64,
    /// Length of the raw encoded record
    pub byte_size: usize,
}

// == Scan Result ==
/// Entries under a prefix, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub total_count: usize,
    pub total_bytes: usize,
    pub items: Vec<StoredItemMeta>,
}

// == Eviction Report ==
/// Outcome of a budget check: the scan it ran plus what was removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    /// Entry count before eviction
    pub total_count: usize,
    /// Byte total before eviction
    pub total_bytes: usize,
    /// Scanned entries before eviction, newest first
    pub items: Vec<StoredItemMeta>,
    pub removed_count: usize,
    pub removed_bytes: usize,
}

impl EvictionReport {
    /// The entries that survived, newest first.
    pub fn retained(&self) -> &[StoredItemMeta] {
        &self.items[..self.items.len() - self.removed_count]
    }
}

impl From<ScanResult> for EvictionReport {
    fn from(scan: ScanResult) -> Self {
        Self {
            total_count: scan.total_count,
            total_bytes: scan.total_bytes,
            items: scan.items,
            removed_count: 0,
            removed_bytes: 0,
        }
    }
}

/// Number of entries to keep for a namespace over budget.
///
/// Returns `None` when the namespace fits the budget.
pub fn target_keep_count(total_count: usize, total_bytes: usize, byte_budget: usize) -> Option<usize> {
    if total_bytes <= byte_budget {
        return None;
    }
    let keep_fraction = byte_budget as f64 / total_bytes as f64;
    Some((total_count as f64 * keep_fraction).floor() as usize)
}

/// Moves `key` to the front of the run of items sharing its timestamp.
fn promote_within_tie(items: &mut [StoredItemMeta], key: &str) {
    let Some(pos) = items.iter().position(|item| item.key == key) else {
        return;
    };
    let timestamp = items[pos].timestamp;
    let start = items[..pos]
        .iter()
        .rposition(|item| item.timestamp != timestamp)
        .map_or(0, |i| i + 1);
    items[start..=pos].rotate_right(1);
}

impl LocalCache {
    // == Scan ==
    /// Lists every entry whose key starts with `prefix`.
    ///
    /// Entries without a positive leading timestamp are deleted and left out
    /// of the result.
    pub fn scan(&mut self, prefix: &str) -> ScanResult {
        if let Err(err) = self.availability() {
            debug!("Scan of {} skipped: {}", prefix, err);
            return ScanResult::default();
        }

        let mut items = Vec::new();
        for key in self.keys_with_prefix(prefix) {
            let Some(raw) = self.raw(&key) else {
                continue;
            };
            match leading_timestamp(&raw) {
                Some(timestamp) => items.push(StoredItemMeta {
                    key,
                    timestamp,
                    byte_size: raw.len(),
                }),
                None => {
                    warn!("Removing corrupt cache entry {}", key);
                    if self.remove_key(&key) {
                        self.stats_mut().record_healed();
                    }
                }
            }
        }

        items.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.key.cmp(&b.key))
        });

        ScanResult {
            total_count: items.len(),
            total_bytes: items.iter().map(|item| item.byte_size).sum(),
            items,
        }
    }

    // == Evict Over Budget ==
    /// Scans `prefix` and, if it exceeds `byte_budget`, deletes all but the
    /// most recent `floor(count * budget / bytes)` entries.
    pub fn evict_over_budget(&mut self, prefix: &str, byte_budget: usize) -> EvictionReport {
        self.evict_keeping_newest(prefix, byte_budget, None)
    }

    /// Like [`evict_over_budget`](Self::evict_over_budget), for use right
    /// after writing `fresh_key`: it is ordered ahead of entries sharing its
    /// timestamp, so a write is never evicted by its own budget check.
    pub(crate) fn evict_after_write(
        &mut self,
        prefix: &str,
        byte_budget: usize,
        fresh_key: &str,
    ) -> EvictionReport {
        self.evict_keeping_newest(prefix, byte_budget, Some(fresh_key))
    }

    fn evict_keeping_newest(
        &mut self,
        prefix: &str,
        byte_budget: usize,
        fresh_key: Option<&str>,
    ) -> EvictionReport {
        let mut report = EvictionReport::from(self.scan(prefix));
        if let Some(fresh_key) = fresh_key {
            promote_within_tie(&mut report.items, fresh_key);
        }

        let Some(keep) = target_keep_count(report.total_count, report.total_bytes, byte_budget)
        else {
            return report;
        };

        if keep <= 1 {
            // TODO: a namespace of one or two oversized entries never gets trimmed; decide whether to fall back to a greedy pass
            debug!(
                "Namespace {} over budget ({} > {}) but keep count is {}, skipping",
                prefix, report.total_bytes, byte_budget, keep
            );
            return report;
        }

        let doomed: Vec<(String, usize)> = report.items[keep..]
            .iter()
            .map(|item| (item.key.clone(), item.byte_size))
            .collect();
        for (key, bytes) in doomed {
            if self.remove_key(&key) {
                self.stats_mut().record_eviction(bytes);
            }
            report.removed_count += 1;
            report.removed_bytes += bytes;
        }

        info!(
            "Evicted {} entries ({} bytes) from {}, kept {}",
            report.removed_count, report.removed_bytes, prefix, keep
        );
        report
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::record::StoredValue;
    use crate::cache::{KeyValueStore, MemoryStore};

    fn seeded(entries: &[(&str, i64, usize)]) -> LocalCache {
        let mut cache = LocalCache::new(MemoryStore::new());
        for (key, ts, len) in entries {
            cache.put_at(key, StoredValue::Raw("x".repeat(*len)), *ts);
        }
        cache
    }

    #[test]
    fn test_scan_sorts_newest_first() {
        let mut cache = seeded(&[
            ("page_a", 100, 10),
            ("page_b", 300, 10),
            ("page_c", 200, 10),
            ("search_z", 400, 10),
        ]);

        let scan = cache.scan("page_");
        let keys: Vec<&str> = scan.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["page_b", "page_c", "page_a"]);
        assert_eq!(scan.total_count, 3);
    }

    #[test]
    fn test_scan_byte_size_is_raw_length() {
        let mut cache = seeded(&[("page_a", 100, 10)]);
        let scan = cache.scan("page_");
        // "100:raw-string:" + 10 chars
        assert_eq!(scan.items[0].byte_size, 25);
        assert_eq!(scan.total_bytes, 25);
    }

    #[test]
    fn test_scan_removes_corrupt_entries() {
        let mut store = MemoryStore::new();
        store.set("page_ok", "100:int:1".to_string()).unwrap();
        store.set("page_zero", "0:int:1".to_string()).unwrap();
        store.set("page_junk", "junk".to_string()).unwrap();
        let mut cache = LocalCache::new(store);

        let scan = cache.scan("page_");
        assert_eq!(scan.total_count, 1);
        assert_eq!(scan.items[0].key, "page_ok");
        assert!(!cache.exists("page_zero", false));
        assert!(!cache.exists("page_junk", false));
        assert_eq!(cache.stats().healed, 2);
    }

    #[test]
    fn test_scan_unavailable_is_empty() {
        let mut cache = LocalCache::new(MemoryStore::unavailable());
        assert_eq!(cache.scan("page_"), ScanResult::default());
    }

    #[test]
    fn test_evict_under_budget_is_noop() {
        let mut cache = seeded(&[("page_a", 100, 10), ("page_b", 200, 10)]);
        let report = cache.evict_over_budget("page_", 10_000);
        assert_eq!(report.removed_count, 0);
        assert_eq!(report.total_count, 2);
    }

    #[test]
    fn test_evict_keeps_most_recent() {
        // 10 entries of 25 bytes each = 250 bytes
        let entries: Vec<(String, i64)> = (0..10).map(|i| (format!("page_{i}"), 100 + i)).collect();
        let refs: Vec<(&str, i64, usize)> = entries.iter().map(|(k, t)| (k.as_str(), *t, 10)).collect();
        let mut cache = seeded(&refs);

        // budget 100 of 250 -> keep floor(10 * 0.4) = 4
        let report = cache.evict_over_budget("page_", 100);
        assert_eq!(report.removed_count, 6);
        assert_eq!(report.removed_bytes, 6 * 25);

        let kept: Vec<&str> = report.retained().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(kept, vec!["page_9", "page_8", "page_7", "page_6"]);
        assert_eq!(cache.scan("page_").total_count, 4);
        assert_eq!(cache.stats().evictions, 6);
    }

    #[test]
    fn test_evict_skips_degenerate_keep_count() {
        let mut cache = seeded(&[("page_a", 100, 10)]);
        let report = cache.evict_over_budget("page_", 0);
        assert_eq!(report.removed_count, 0);
        assert!(cache.exists("page_a", false));

        // Two entries, keep = floor(2 * 10 / 50) = 0
        let mut cache = seeded(&[("page_a", 100, 10), ("page_b", 200, 10)]);
        let report = cache.evict_over_budget("page_", 10);
        assert_eq!(report.removed_count, 0);
        assert_eq!(cache.scan("page_").total_count, 2);
    }

    #[test]
    fn test_evict_only_touches_prefix() {
        let mut cache = seeded(&[
            ("page_a", 100, 10),
            ("page_b", 200, 10),
            ("page_c", 300, 10),
            ("page_d", 400, 10),
            ("search_a", 50, 10),
        ]);
        // 100 bytes, budget 50 -> keep 2
        let report = cache.evict_over_budget("page_", 50);
        assert_eq!(report.removed_count, 2);
        assert!(cache.exists("search_a", false));
        assert!(!cache.exists("page_a", false));
        assert!(!cache.exists("page_b", false));
    }

    #[test]
    fn test_target_keep_count() {
        assert_eq!(target_keep_count(10, 100, 100), None);
        assert_eq!(target_keep_count(10, 200, 100), Some(5));
        assert_eq!(target_keep_count(1, 100, 0), Some(0));
        assert_eq!(target_keep_count(3, 90, 40), Some(1));
    }

    #[test]
    fn test_evict_after_write_keeps_fresh_key_in_tie() {
        // Same second for every entry; key order alone would drop page_d
        let mut cache = seeded(&[
            ("page_a", 500, 10),
            ("page_b", 500, 10),
            ("page_c", 500, 10),
            ("page_d", 500, 10),
        ]);
        let bytes = cache.scan("page_").total_bytes;

        let report = cache.evict_after_write("page_", bytes / 2, "page_d");

        assert_eq!(report.removed_count, 2);
        let kept: Vec<&str> = report.retained().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(kept, vec!["page_d", "page_a"]);
        assert!(cache.exists("page_d", false));
        assert!(!cache.exists("page_c", false));
    }

    #[test]
    fn test_promote_within_tie_leaves_newer_items_first() {
        let meta = |key: &str, timestamp| StoredItemMeta {
            key: key.to_string(),
            timestamp,
            byte_size: 1,
        };
        let mut items = vec![meta("n", 9), meta("a", 5), meta("b", 5), meta("c", 5), meta("o", 1)];
        promote_within_tie(&mut items, "c");
        let keys: Vec<&str> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["n", "c", "a", "b", "o"]);
    }
}
