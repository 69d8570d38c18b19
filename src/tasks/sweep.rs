//! Cache Sweep Task
//!
//! Background task that periodically applies the page byte budget and scans
//! the other namespaces, which drops entries without a valid timestamp.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::LocalCache;
use crate::keys::Namespace;

/// Runs one sweep over every namespace. Returns the number of entries evicted.
pub fn sweep_once(cache: &mut LocalCache, page_byte_budget: usize) -> usize {
    let mut evicted = 0;
    for ns in Namespace::ALL {
        if ns == Namespace::Page {
            evicted += cache.evict_over_budget(ns.prefix(), page_byte_budget).removed_count;
        } else {
            cache.scan(ns.prefix());
        }
    }
    evicted
}

/// Spawns a background task that sweeps the cache every `interval_secs`.
///
/// The returned handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = client.cache();
/// let sweep_handle = spawn_sweep_task(cache, 300, 2 * 1024 * 1024);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(
    cache: Arc<RwLock<LocalCache>>,
    interval_secs: u64,
    page_byte_budget: usize,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {} seconds", interval_secs);

        loop {
            tokio::time::sleep(interval).await;

            let evicted = {
                let mut cache_guard = cache.write().await;
                sweep_once(&mut cache_guard, page_byte_budget)
            };

            if evicted > 0 {
                info!("Cache sweep: evicted {} page entries", evicted);
            } else {
                debug!("Cache sweep: nothing to evict");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{KeyValueStore, MemoryStore, StoredValue};

    fn seeded() -> LocalCache {
        let mut store = MemoryStore::new();
        store.set("search_junk", "not-a-record".to_string()).unwrap();
        let mut cache = LocalCache::new(store);
        for i in 0..4 {
            cache.put_at(&format!("page_{i}"), StoredValue::Raw("x".repeat(100)), 1000 + i);
        }
        cache
    }

    #[test]
    fn test_sweep_once_evicts_and_heals() {
        let mut cache = seeded();
        // 4 x 116 bytes, budget 240 -> keep 2
        let evicted = sweep_once(&mut cache, 240);
        assert_eq!(evicted, 2);
        assert!(!cache.exists("search_junk", false));
        assert!(cache.exists("page_3", false));
        assert!(!cache.exists("page_0", false));
    }

    #[tokio::test]
    async fn test_sweep_task_runs() {
        let cache = Arc::new(RwLock::new(seeded()));

        let handle = spawn_sweep_task(cache.clone(), 1, 240);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let cache_guard = cache.read().await;
            assert_eq!(cache_guard.stats().evictions, 2);
            assert!(!cache_guard.exists("search_junk", false));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache = Arc::new(RwLock::new(seeded()));

        let handle = spawn_sweep_task(cache, 1, 240);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
