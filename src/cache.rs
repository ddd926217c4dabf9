//! In-memory TTL memo for provider result pages.
//!
//! Best-effort latency optimization only: entries are keyed by the serialized
//! filter, evicted by age, and never required for correctness. Writes are
//! idempotent overwrite-by-key, so concurrent refreshes of the same key are
//! harmless.
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::model::NewsPage;

/// Default entry lifetime: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    stored_at: Instant,
    page: NewsPage,
}

pub struct TtlCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a clone of the cached page if the entry is still fresh.
    pub fn get(&self, key: &str) -> Option<NewsPage> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.page.clone())
    }

    /// Stores a page, overwriting any previous entry for the key. Expired
    /// entries are pruned on the way through so the map does not grow without
    /// bound across distinct filters.
    pub fn put(&self, key: &str, page: NewsPage) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        entries.insert(
            key.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                page,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64) -> NewsPage {
        NewsPage {
            total_results: total,
            ..NewsPage::empty()
        }
    }

    #[test]
    fn fresh_entries_are_returned() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("k", page(7));
        assert_eq!(cache.get("k").unwrap().total_results, 7);
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.put("k", page(7));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn put_overwrites_by_key() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("k", page(1));
        cache.put("k", page(2));
        assert_eq!(cache.get("k").unwrap().total_results, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_prunes_expired_entries() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.put("a", page(1));
        cache.put("b", page(2));
        // Both writes expire instantly; the second prune drops the first key.
        assert_eq!(cache.len(), 1);
    }
}
