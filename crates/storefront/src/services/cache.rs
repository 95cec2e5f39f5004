//! In-memory cache for slow-changing catalog lookups.
//!
//! Categories and delivery areas are read on nearly every page load and
//! change rarely, so both lists are held in `moka` for five minutes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::db::{AreaRepository, CatalogRepository, RepositoryError};
use crate::models::{Area, Category};

const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Categories,
    Areas,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Areas(Arc<Vec<Area>>),
}

/// Shared cache of categories and areas.
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();
        Self { cache }
    }

    /// All categories, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the categories have to be loaded and the
    /// query fails.
    pub async fn categories(&self, pool: &PgPool) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CatalogRepository::new(pool).list_categories().await?);
        self.cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// All delivery areas, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the areas have to be loaded and the query
    /// fails.
    pub async fn areas(&self, pool: &PgPool) -> Result<Arc<Vec<Area>>, RepositoryError> {
        if let Some(CacheValue::Areas(areas)) = self.cache.get(&CacheKey::Areas).await {
            debug!("Cache hit for areas");
            return Ok(areas);
        }

        let areas = Arc::new(AreaRepository::new(pool).list().await?);
        self.cache
            .insert(CacheKey::Areas, CacheValue::Areas(Arc::clone(&areas)))
            .await;
        Ok(areas)
    }

    /// Drop the area list after an area was created.
    pub async fn invalidate_areas(&self) {
        self.cache.invalidate(&CacheKey::Areas).await;
    }
}
