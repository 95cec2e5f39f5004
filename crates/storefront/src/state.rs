//! Shared handler state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::cache::CatalogCache;

/// Config, pool and catalog cache, behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Shared>,
}

struct Shared {
    config: StorefrontConfig,
    pool: PgPool,
    cache: CatalogCache,
}

impl AppState {
    /// Wrap the config and pool. The category/area cache starts empty and
    /// fills on first read.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(Shared {
                config,
                pool,
                cache: CatalogCache::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Categories and delivery areas.
    #[must_use]
    pub fn cache(&self) -> &CatalogCache {
        &self.inner.cache
    }
}
