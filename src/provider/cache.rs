use crate::services::api::{AnalyticsReport, DashboardSnapshot, DashboardStats, Topic};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Dashboard,
    DashboardStats,
    Topics,
    Analytics,
}

impl QueryKey {
    pub const ALL: [QueryKey; 4] = [
        QueryKey::Dashboard,
        QueryKey::DashboardStats,
        QueryKey::Topics,
        QueryKey::Analytics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Dashboard => "dashboard",
            QueryKey::DashboardStats => "dashboard-stats",
            QueryKey::Topics => "topics",
            QueryKey::Analytics => "analytics",
        }
    }

    pub fn for_table(table: &str) -> &'static [QueryKey] {
        match table {
            "reviews" => &[QueryKey::Dashboard, QueryKey::DashboardStats, QueryKey::Topics],
            "sentiment_analysis" => &[
                QueryKey::Dashboard,
                QueryKey::DashboardStats,
                QueryKey::Analytics,
            ],
            // Unknown tables invalidate everything rather than nothing.
            _ => &QueryKey::ALL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Snapshot(DashboardSnapshot),
    Stats(DashboardStats),
    Topics(Vec<Topic>),
    Analytics(AnalyticsReport),
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CachedValue,
    pub stale: bool,
    pub fetched_at: Instant,
}

#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, key: QueryKey, value: CachedValue) {
        self.lock().insert(
            key,
            CacheEntry {
                value,
                stale: false,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, key: QueryKey) -> Option<CacheEntry> {
        self.lock().get(&key).cloned()
    }

    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        match self.lock().get(&QueryKey::Dashboard) {
            Some(CacheEntry {
                value: CachedValue::Snapshot(snapshot),
                ..
            }) => Some(snapshot.clone()),
            _ => None,
        }
    }

    pub fn is_stale(&self, key: QueryKey) -> bool {
        self.lock().get(&key).map(|entry| entry.stale).unwrap_or(true)
    }

    pub fn invalidate(&self, key: QueryKey) -> bool {
        match self.lock().get_mut(&key) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    pub fn invalidate_table(&self, table: &str) {
        for key in QueryKey::for_table(table) {
            self.invalidate(*key);
        }
    }

    pub fn remove(&self, key: QueryKey) -> Option<CacheEntry> {
        self.lock().remove(&key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::DashboardMetrics;

    fn sample_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            metrics: DashboardMetrics {
                total_reviews: 10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn insert_then_get_round_trips() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(sample_snapshot()));

        let entry = cache.get(QueryKey::Dashboard).unwrap();
        assert!(!entry.stale);
        assert_eq!(cache.snapshot().unwrap().metrics.total_reviews, 10);
    }

    #[test]
    fn missing_entries_count_as_stale() {
        let cache = QueryCache::new();
        assert!(cache.is_stale(QueryKey::Topics));
    }

    #[test]
    fn invalidate_marks_stale_without_evicting() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(sample_snapshot()));

        assert!(cache.invalidate(QueryKey::Dashboard));
        assert!(cache.is_stale(QueryKey::Dashboard));
        assert!(cache.snapshot().is_some());
    }

    #[test]
    fn refetch_replaces_stale_entry() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(sample_snapshot()));
        cache.invalidate(QueryKey::Dashboard);

        cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(sample_snapshot()));
        assert!(!cache.is_stale(QueryKey::Dashboard));
    }

    #[test]
    fn table_mapping_invalidates_matching_keys() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(sample_snapshot()));
        cache.insert(QueryKey::Topics, CachedValue::Topics(Vec::new()));
        cache.insert(QueryKey::Analytics, CachedValue::Analytics(Default::default()));

        cache.invalidate_table("reviews");
        assert!(cache.is_stale(QueryKey::Dashboard));
        assert!(cache.is_stale(QueryKey::Topics));
        assert!(!cache.is_stale(QueryKey::Analytics));
    }

    #[test]
    fn unknown_table_invalidates_everything() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(sample_snapshot()));
        cache.insert(QueryKey::Analytics, CachedValue::Analytics(Default::default()));

        cache.invalidate_table("mystery");
        assert!(cache.is_stale(QueryKey::Dashboard));
        assert!(cache.is_stale(QueryKey::Analytics));
    }

    #[test]
    fn remove_and_clear_discard_entries() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(sample_snapshot()));
        cache.insert(QueryKey::Topics, CachedValue::Topics(Vec::new()));

        assert!(cache.remove(QueryKey::Topics).is_some());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
