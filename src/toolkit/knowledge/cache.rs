use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use super::models::{DiseaseProfile, FollowUpQuestion};
use super::repository::KnowledgeRepository;
use crate::core::error::Result;


/// Read-through cache in front of a slower knowledge store.
pub struct CachedKnowledgeRepository<R> {
    inner: R,
    profiles: Mutex<Option<(Vec<DiseaseProfile>, Instant)>>,
    followups: Mutex<LruCache<String, (Vec<FollowUpQuestion>, Instant)>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub cached_followups: usize,
    pub hit_rate: f64,
}

impl<R: KnowledgeRepository> CachedKnowledgeRepository<R> {
    pub fn new(inner: R, capacity: usize, ttl_secs: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            profiles: Mutex::new(None),
            followups: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(ttl_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn cached_profiles(&self) -> Option<Vec<DiseaseProfile>> {
        let guard = self.profiles.lock();
        match guard.as_ref() {
            Some((profiles, loaded_at)) if loaded_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(profiles.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn cached_followups(&self, disease_name: &str) -> Option<Vec<FollowUpQuestion>> {
        let mut cache = self.followups.lock();
        match cache.get(disease_name) {
            Some((questions, loaded_at)) if loaded_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(questions.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };

        CacheStats {
            hits,
            misses,
            cached_followups: self.followups.lock().len(),
            hit_rate,
        }
    }

    pub fn invalidate(&self) {
        *self.profiles.lock() = None;
        self.followups.lock().clear();
        debug!("Knowledge cache invalidated");
    }
}

#[async_trait]
impl<R: KnowledgeRepository> KnowledgeRepository for CachedKnowledgeRepository<R> {
    async fn disease_profiles(&self) -> Result<Vec<DiseaseProfile>> {
        if let Some(profiles) = self.cached_profiles() {
            return Ok(profiles);
        }

        let profiles = self.inner.disease_profiles().await?;
        *self.profiles.lock() = Some((profiles.clone(), Instant::now()));
        Ok(profiles)
    }

    async fn followup_questions(&self, disease_name: &str) -> Result<Vec<FollowUpQuestion>> {
        if let Some(questions) = self.cached_followups(disease_name) {
            return Ok(questions);
        }

        let questions = self.inner.followup_questions(disease_name).await?;
        self.followups
            .lock()
            .put(disease_name.to_string(), (questions.clone(), Instant::now()));
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::knowledge::repository::InMemoryKnowledgeStore;

    #[tokio::test]
    async fn test_cache_hits_after_first_load() {
        let cache = CachedKnowledgeRepository::new(InMemoryKnowledgeStore::builtin().unwrap(), 8, 300);

        assert_eq!(cache.disease_profiles().await.unwrap().len(), 10);
        assert_eq!(cache.disease_profiles().await.unwrap().len(), 10);
        assert_eq!(cache.followup_questions("Dengue").await.unwrap().len(), 5);
        assert_eq!(cache.followup_questions("Dengue").await.unwrap().len(), 5);

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.cached_followups, 1);
        assert!((stats.hit_rate - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_reloads() {
        let cache = CachedKnowledgeRepository::new(InMemoryKnowledgeStore::builtin().unwrap(), 8, 0);
        cache.disease_profiles().await.unwrap();
        cache.disease_profiles().await.unwrap();
        assert_eq!(cache.stats().hits, 0);

        cache.invalidate();
        assert_eq!(cache.stats().cached_followups, 0);
    }
}
