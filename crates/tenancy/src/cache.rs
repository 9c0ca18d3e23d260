use std::sync::Arc;

use {async_trait::async_trait, dashmap::DashMap, remoql_model::OrgId, tracing::debug};

use crate::{OrganizationCache, OrganizationSource, Result};

/// Organization cache populated lazily from an [`OrganizationSource`].
///
/// Entries are added on the first successful lookup of an id and are only
/// removed through [`CachedOrganizations::invalidate`] or
/// [`CachedOrganizations::clear`]. Misses are not cached. Two concurrent
/// misses for the same id may both hit the source; the last write wins and
/// both writers store the same value.
pub struct CachedOrganizations<S> {
    source: S,
    entries: Arc<DashMap<String, OrgId>>,
}

impl<S: OrganizationSource> CachedOrganizations<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn invalidate(&self, org_id: &str) -> Option<OrgId> {
        self.entries.remove(org_id).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl<S: OrganizationSource> OrganizationCache for CachedOrganizations<S> {
    async fn find(&self, org_id: &str) -> Result<Option<OrgId>> {
        // The guard must be dropped before awaiting the source.
        if let Some(hit) = self.entries.get(org_id).map(|e| e.value().clone()) {
            return Ok(Some(hit));
        }

        let loaded = self.source.load(org_id).await?;
        if let Some(ref resolved) = loaded {
            debug!(org_id, resolved = %resolved, "organization cached");
            self.entries.insert(org_id.to_string(), resolved.clone());
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingSource {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl OrganizationSource for CountingSource {
        async fn load(&self, org_id: &str) -> Result<Option<OrgId>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok((org_id != "404").then(|| OrgId::new(org_id)))
        }
    }

    fn cache() -> Arc<CachedOrganizations<CountingSource>> {
        Arc::new(CachedOrganizations::new(CountingSource {
            loads: AtomicUsize::new(0),
        }))
    }

    #[tokio::test]
    async fn populates_on_first_lookup_only() {
        let cache = cache();
        assert_eq!(cache.find("42").await.unwrap(), Some(OrgId::new("42")));
        assert_eq!(cache.find("42").await.unwrap(), Some(OrgId::new("42")));
        assert_eq!(cache.source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let cache = cache();
        assert_eq!(cache.find("404").await.unwrap(), None);
        assert_eq!(cache.find("404").await.unwrap(), None);
        assert_eq!(cache.source.loads.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let cache = cache();
        cache.find("7").await.unwrap();
        assert_eq!(cache.invalidate("7"), Some(OrgId::new("7")));
        cache.find("7").await.unwrap();
        assert_eq!(cache.source.loads.load(Ordering::SeqCst), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_population_stays_consistent() {
        let cache = cache();
        let mut handles = Vec::new();
        for i in 0..64 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let id = (i % 4).to_string();
                cache.find(&id).await.unwrap()
            }));
        }
        for (i, h) in handles.into_iter().enumerate() {
            let got = h.await.unwrap();
            assert_eq!(got, Some(OrgId::new((i % 4).to_string())));
        }
        assert_eq!(cache.len(), 4);
        for id in ["0", "1", "2", "3"] {
            assert_eq!(cache.find(id).await.unwrap(), Some(OrgId::new(id)));
        }
    }
}
