//! Lazy category-owner cache with single-flight population.
//!
//! Maps a category id to its owning profile. Ownership never changes for
//! the lifetime of a session (a category keeps one owner until deleted, and
//! ids are not reused in-process), so entries are memoized on first access
//! and served without further directory calls.
//!
//! # Single-flight
//!
//! Concurrent lookups for the same uncached key coalesce into one
//! `ShareDirectory::find_owner` call via Moka's `try_get_with`; the other
//! callers wait for the in-flight result. A failed or empty resolution is
//! returned to every waiter but is **not** memoized, so a later call retries
//! the directory instead of serving a poisoned entry.
//!
//! # Metrics
//!
//! Hits and misses are recorded to `taskshare_owner_cache_hits_total` /
//! `taskshare_owner_cache_misses_total`.

use std::sync::Arc;

use moka::future::Cache;

use crate::error::{ShareError, ShareResult};
use crate::identity::ProfileId;
use crate::model::CategoryId;
use crate::resolver::traits::ShareDirectory;

/// Configuration for the owner cache.
#[derive(Debug, Clone)]
pub struct OwnerCacheConfig {
    /// Maximum number of memoized category→owner entries.
    ///
    /// There is no TTL: entries live until explicit invalidation or
    /// capacity eviction, matching the one-owner-per-session model.
    pub max_capacity: u64,
}

impl Default for OwnerCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl OwnerCacheConfig {
    /// Sets the maximum capacity.
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

/// Memoizing category→owner resolver.
///
/// # Thread Safety
///
/// Fully thread-safe; at most one directory resolution runs per key at any
/// time, and the cache itself never holds a lock across the external call
/// for other keys, so a resolver that re-enters the cache cannot deadlock.
pub struct OwnerCache<D> {
    cache: Cache<CategoryId, ProfileId>,
    directory: Arc<D>,
    config: OwnerCacheConfig,
}

impl<D> std::fmt::Debug for OwnerCache<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerCache")
            .field("config", &self.config)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl<D> OwnerCache<D>
where
    D: ShareDirectory + 'static,
{
    /// Creates a new owner cache with the default configuration.
    pub fn new(directory: Arc<D>) -> Self {
        Self::with_config(directory, OwnerCacheConfig::default())
    }

    /// Creates a new owner cache with the given configuration.
    pub fn with_config(directory: Arc<D>, config: OwnerCacheConfig) -> Self {
        let cache = Cache::builder().max_capacity(config.max_capacity).build();
        Self {
            cache,
            directory,
            config,
        }
    }

    /// Returns the configuration for this cache.
    pub fn config(&self) -> &OwnerCacheConfig {
        &self.config
    }

    /// Resolves the owner of a category, memoizing the result.
    ///
    /// The first call per key invokes `ShareDirectory::find_owner`; when the
    /// directory reports no owner the call fails with
    /// [`ShareError::OwnerNotFound`] and nothing is cached. Subsequent calls
    /// for a populated key return the memoized profile with no external call.
    pub async fn resolve(&self, category_id: CategoryId) -> ShareResult<ProfileId> {
        if let Some(owner) = self.cache.get(&category_id).await {
            metrics::counter!("taskshare_owner_cache_hits_total").increment(1);
            return Ok(owner);
        }
        metrics::counter!("taskshare_owner_cache_misses_total").increment(1);

        let directory = Arc::clone(&self.directory);
        self.cache
            .try_get_with(category_id, async move {
                match directory.find_owner(category_id).await? {
                    Some(owner) => Ok(owner),
                    None => Err(ShareError::OwnerNotFound { category_id }),
                }
            })
            .await
            // Moka shares one failure between coalesced waiters as an Arc.
            .map_err(|e: Arc<ShareError>| (*e).clone())
    }

    /// Drops the memoized owner for one category.
    ///
    /// Escape hatch for the caller that deletes a category (or observes an
    /// ownership transfer) mid-session; the cache itself never expires
    /// entries on its own.
    pub async fn invalidate(&self, category_id: CategoryId) {
        self.cache.invalidate(&category_id).await;
    }

    /// Drops every memoized owner.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the approximate number of memoized entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs pending maintenance tasks. Useful for testing eviction behavior.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

/// Registers owner cache metrics descriptions.
///
/// Call once during application startup to register metric descriptions
/// with the metrics recorder. Optional, but provides better documentation
/// in Prometheus/Grafana.
pub fn register_owner_cache_metrics() {
    metrics::describe_counter!(
        "taskshare_owner_cache_hits_total",
        "Total number of owner cache hits"
    );
    metrics::describe_counter!(
        "taskshare_owner_cache_misses_total",
        "Total number of owner cache misses"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::mocks::MockShareDirectory;

    #[tokio::test]
    async fn test_resolve_memoizes_after_first_lookup() {
        // Arrange
        let directory = Arc::new(MockShareDirectory::new());
        directory.put_category(7, ProfileId::new("acme.it", "alice"));
        let cache = OwnerCache::new(Arc::clone(&directory));

        // Act
        let first = cache.resolve(7).await.unwrap();
        let second = cache.resolve(7).await.unwrap();

        // Assert - identical owner, exactly one external resolution
        assert_eq!(first, ProfileId::new("acme.it", "alice"));
        assert_eq!(first, second);
        assert_eq!(directory.find_owner_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_owner_fails_and_is_not_memoized() {
        // Arrange - category 9 does not exist
        let directory = Arc::new(MockShareDirectory::new());
        let cache = OwnerCache::new(Arc::clone(&directory));

        // Act
        let missing = cache.resolve(9).await;
        assert!(matches!(
            missing,
            Err(ShareError::OwnerNotFound { category_id: 9 })
        ));

        // The category appears afterwards; the failure must not have been
        // cached as a negative result.
        directory.put_category(9, ProfileId::new("acme.it", "bob"));
        let found = cache.resolve(9).await.unwrap();

        // Assert
        assert_eq!(found, ProfileId::new("acme.it", "bob"));
        assert_eq!(directory.find_owner_calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_trigger_single_resolution() {
        // Arrange
        let directory = Arc::new(MockShareDirectory::new());
        directory.put_category(3, ProfileId::new("acme.it", "alice"));
        let cache = Arc::new(OwnerCache::new(Arc::clone(&directory)));

        // Act - many tasks race on the same uncached key
        let mut handles = Vec::new();
        for _ in 0..32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move { cache.resolve(3).await }));
        }
        let results = futures::future::join_all(handles).await;

        // Assert - everybody got the owner, the directory was asked once
        for result in results {
            assert_eq!(
                result.unwrap().unwrap(),
                ProfileId::new("acme.it", "alice")
            );
        }
        assert_eq!(directory.find_owner_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_re_resolution() {
        // Arrange
        let directory = Arc::new(MockShareDirectory::new());
        directory.put_category(5, ProfileId::new("acme.it", "alice"));
        let cache = OwnerCache::new(Arc::clone(&directory));
        cache.resolve(5).await.unwrap();

        // Act - ownership transfer observed by the caller
        directory.put_category(5, ProfileId::new("acme.it", "carol"));
        cache.invalidate(5).await;

        // Assert
        assert_eq!(
            cache.resolve(5).await.unwrap(),
            ProfileId::new("acme.it", "carol")
        );
        assert_eq!(directory.find_owner_calls(), 2);
    }

    #[tokio::test]
    async fn test_directory_failure_propagates_without_poisoning() {
        // Arrange
        let directory = Arc::new(MockShareDirectory::new());
        directory.put_category(11, ProfileId::new("acme.it", "alice"));
        directory.fail_next_find_owner();
        let cache = OwnerCache::new(Arc::clone(&directory));

        // Act
        let failed = cache.resolve(11).await;
        assert!(matches!(failed, Err(ShareError::Directory { .. })));

        // Assert - the next call retries and succeeds
        assert_eq!(
            cache.resolve(11).await.unwrap(),
            ProfileId::new("acme.it", "alice")
        );
    }
}
