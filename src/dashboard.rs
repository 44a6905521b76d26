//! Process-scoped dashboard state and the refresh cycle
//!
//! A [`Dashboard`] owns the supported-version table and the in-flight flag.
//! Both start empty/false, the table changes only when the documentation
//! source is reloaded, and the flag only at the start and end of a cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::{CacheEntry, CacheError, ResultStore, current_timestamp_ms};
use crate::config::{CACHE_KEY, DEFAULT_CACHE_TTL_MS, TimeoutConfig};
use crate::driver::batch::{BatchError, resolve_all, sort_results};
use crate::driver::result::DriverResult;
use crate::driver::spec::DriverSpec;
use crate::release::provider::ReleaseProvider;
use crate::support_table::{StaticSource, SupportedVersionsSource};
use crate::version::support::SupportedVersionTable;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// What a refresh cycle produced
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Freshly resolved from the hosting API
    Resolved(Vec<DriverResult>),
    /// Served from the cache
    Cached {
        results: Vec<DriverResult>,
        age_ms: i64,
    },
    /// Another cycle was already in flight
    Skipped,
}

impl RefreshOutcome {
    pub fn results(&self) -> Option<&[DriverResult]> {
        match self {
            RefreshOutcome::Resolved(results) | RefreshOutcome::Cached { results, .. } => {
                Some(results)
            }
            RefreshOutcome::Skipped => None,
        }
    }
}

/// Clears the in-flight flag when the cycle ends, however it ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Dashboard {
    provider: Arc<dyn ReleaseProvider>,
    store: Arc<dyn ResultStore>,
    support_source: Arc<dyn SupportedVersionsSource>,
    drivers: Vec<DriverSpec>,
    timeouts: TimeoutConfig,
    cache_ttl_ms: i64,
    supported: RwLock<Arc<SupportedVersionTable>>,
    loading: AtomicBool,
}

impl Dashboard {
    pub fn new(
        provider: Arc<dyn ReleaseProvider>,
        store: Arc<dyn ResultStore>,
        drivers: Vec<DriverSpec>,
    ) -> Self {
        Self {
            provider,
            store,
            support_source: Arc::new(StaticSource::default()),
            drivers,
            timeouts: TimeoutConfig::default(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            supported: RwLock::new(Arc::new(SupportedVersionTable::new())),
            loading: AtomicBool::new(false),
        }
    }

    pub fn with_support_source(mut self, source: Arc<dyn SupportedVersionsSource>) -> Self {
        self.support_source = source;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_cache_ttl(mut self, ttl_ms: i64) -> Self {
        self.cache_ttl_ms = ttl_ms;
        self
    }

    pub fn drivers(&self) -> &[DriverSpec] {
        &self.drivers
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Snapshot of the current supported-version table
    pub fn supported_versions(&self) -> Arc<SupportedVersionTable> {
        self.supported
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Reload the supported-version table from its source.
    ///
    /// Fetched entries are merged over the current table; on failure the
    /// current table is kept. Returns whether anything was loaded.
    pub async fn reload_supported_versions(&self) -> bool {
        let fetched = match self.support_source.fetch().await {
            Ok(table) => table,
            Err(e) => {
                warn!("Failed to load supported versions: {}", e);
                return false;
            }
        };

        if fetched.is_empty() {
            warn!("Supported versions source returned no entries");
            return false;
        }

        let mut supported = self.supported.write().unwrap_or_else(|e| e.into_inner());
        let mut merged = SupportedVersionTable::clone(&supported);
        merged.merge(fetched);
        *supported = Arc::new(merged);
        info!("Updated supported versions");
        true
    }

    /// Run one refresh cycle.
    ///
    /// A call made while another cycle is in flight returns
    /// [`RefreshOutcome::Skipped`] immediately. Without `force`, a fresh
    /// cached batch is served; otherwise the batch is resolved, sorted and
    /// stored.
    pub async fn refresh(&self, force: bool) -> Result<RefreshOutcome, DashboardError> {
        let Some(_guard) = LoadingGuard::try_acquire(&self.loading) else {
            info!("Refresh already in progress, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        info!("Starting refresh (force: {})", force);

        if force {
            self.reload_supported_versions().await;
        }

        if !force && let Some((results, age_ms)) = self.load_fresh_cache() {
            info!("Using cached data, age: {} hours", age_ms / (60 * 60 * 1000));
            return Ok(RefreshOutcome::Cached { results, age_ms });
        }

        let supported = self.supported_versions();
        let results =
            resolve_all(self.provider.as_ref(), &self.drivers, &supported, &self.timeouts).await?;

        let _ = self
            .store
            .set(CACHE_KEY, &CacheEntry::new(results.clone()))
            .inspect_err(|e| error!("Failed to save results to cache: {}", e));

        Ok(RefreshOutcome::Resolved(results))
    }

    fn load_fresh_cache(&self) -> Option<(Vec<DriverResult>, i64)> {
        let entry = match self.store.get(CACHE_KEY) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                info!("No cache found");
                return None;
            }
            Err(e) => {
                warn!("Cache unreadable, clearing: {}", e);
                let _ = self
                    .clear_cache()
                    .inspect_err(|e| error!("Failed to clear cache: {}", e));
                return None;
            }
        };

        let now = current_timestamp_ms();
        if !entry.is_fresh(now, self.cache_ttl_ms) {
            info!(
                "Cache expired, age: {} hours",
                entry.age_ms(now) / (60 * 60 * 1000)
            );
            return None;
        }

        let age_ms = entry.age_ms(now);
        let mut results = entry.data;
        sort_results(&mut results);
        Some((results, age_ms))
    }

    pub fn clear_cache(&self) -> Result<(), DashboardError> {
        self.store.clear(CACHE_KEY)?;
        info!("Cache cleared");
        Ok(())
    }
}
