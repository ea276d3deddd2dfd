//! The chunked spatial grid store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use grid_common::GeoRect;
use grid_storage::ByteFetcher;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

use super::{FeatureStore, StoreState};
use crate::cache::ChunkCache;
use crate::chunk::{ChunkFetcher, ChunkRequest};
use crate::config::ChunkStoreConfig;
use crate::descriptor::{base_path, load_descriptor};
use crate::error::{ChunkStoreError, Result};
use crate::features::{
    Feature, FeatureCursor, FeatureId, FeatureSequenceBuilder, LocatedChunk,
};
use crate::overview::overview_features;
use crate::query::{plan_query, ChunkRange, DetailLevel, QueryPlan};
use crate::types::{CacheStats, Chunk, GridDescriptor};

/// Read-only feature store over a chunked grid.
///
/// The descriptor is loaded once in the background; until it is, queries
/// answer with an unknown-extent placeholder. Each query resolves the
/// chunks it needs, fetches them concurrently and returns a lazy cursor
/// over the available cells. A chunk that fails to load is logged and
/// left out; it never fails the query.
///
/// Cloning is cheap and clones share the descriptor and chunk cache.
#[derive(Clone)]
pub struct SpatialGridStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    locator: String,
    config: ChunkStoreConfig,
    chunks: ChunkFetcher,
    state: watch::Receiver<StoreState>,
    cache: Option<Mutex<ChunkCache>>,
}

impl SpatialGridStore {
    /// Create a store and start loading the descriptor at `locator`.
    ///
    /// Returns immediately. Must be called from within a tokio runtime.
    pub fn new(
        fetcher: Arc<dyn ByteFetcher>,
        locator: impl Into<String>,
        config: ChunkStoreConfig,
    ) -> Result<Self> {
        config.validate().map_err(ChunkStoreError::Config)?;

        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            ChunkStoreError::Config(format!("store requires a tokio runtime: {}", e))
        })?;

        let locator = locator.into();
        let (tx, rx) = watch::channel(StoreState::Loading);
        let store = Self::build(fetcher.clone(), locator.clone(), config, rx);

        handle.spawn(async move {
            let state = match load_descriptor(fetcher.as_ref(), &locator).await {
                Ok(descriptor) => StoreState::Ready(Arc::new(descriptor)),
                Err(e) => {
                    error!(locator = %locator, error = %e, "Grid descriptor failed to load; store will not become ready");
                    StoreState::Failed(e.to_string())
                }
            };
            tx.send_replace(state);
        });

        Ok(store)
    }

    /// Create a store and wait for its descriptor.
    pub async fn open(
        fetcher: Arc<dyn ByteFetcher>,
        locator: impl Into<String>,
        config: ChunkStoreConfig,
    ) -> Result<Self> {
        let store = Self::new(fetcher, locator, config)?;
        store.wait_ready().await?;
        Ok(store)
    }

    /// Create a store that is ready immediately with an already loaded descriptor.
    pub fn from_descriptor(
        fetcher: Arc<dyn ByteFetcher>,
        locator: impl Into<String>,
        descriptor: GridDescriptor,
        config: ChunkStoreConfig,
    ) -> Result<Self> {
        config.validate().map_err(ChunkStoreError::Config)?;

        let (_tx, rx) = watch::channel(StoreState::Ready(Arc::new(descriptor)));
        Ok(Self::build(fetcher, locator.into(), config, rx))
    }

    fn build(
        fetcher: Arc<dyn ByteFetcher>,
        locator: String,
        config: ChunkStoreConfig,
        state: watch::Receiver<StoreState>,
    ) -> Self {
        let base = base_path(&locator);
        let cache = (config.chunk_cache_size_mb > 0)
            .then(|| Mutex::new(ChunkCache::new(config.chunk_cache_size_bytes())));

        info!(
            locator = %locator,
            base = %base,
            backend = fetcher.backend(),
            cache_mb = config.chunk_cache_size_mb,
            "Created spatial grid store"
        );

        Self {
            inner: Arc::new(StoreInner {
                chunks: ChunkFetcher::new(fetcher, base),
                locator,
                config,
                state,
                cache,
            }),
        }
    }

    /// Descriptor locator this store was created with.
    pub fn locator(&self) -> &str {
        &self.inner.locator
    }

    pub fn config(&self) -> &ChunkStoreConfig {
        &self.inner.config
    }

    /// Snapshot of the lifecycle state.
    pub fn state(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes the transition out of `Loading`.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.clone()
    }

    /// Wait until the descriptor has loaded and return the store's bounds.
    ///
    /// Fails with [`ChunkStoreError::DescriptorFailed`] when loading failed.
    pub async fn wait_ready(&self) -> Result<GeoRect> {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => {
                return Err(ChunkStoreError::DescriptorFailed(
                    "descriptor load ended without a result".to_string(),
                ))
            }
        };

        match state {
            StoreState::Ready(descriptor) => Ok(descriptor.bounds_rect()),
            StoreState::Failed(message) => Err(ChunkStoreError::DescriptorFailed(message)),
            StoreState::Loading => Err(ChunkStoreError::NotReady),
        }
    }

    /// The loaded descriptor, if ready.
    pub fn descriptor(&self) -> Option<Arc<GridDescriptor>> {
        self.inner.state.borrow().descriptor().cloned()
    }

    /// Dataset extent as `[x, width, y, height]`, if ready.
    pub fn bounds(&self) -> Option<GeoRect> {
        self.descriptor().map(|d| d.bounds_rect())
    }

    /// Chunk cache counters. All zero when caching is disabled.
    pub async fn cache_stats(&self) -> CacheStats {
        match &self.inner.cache {
            Some(cache) => cache.lock().await.stats(),
            None => CacheStats::default(),
        }
    }

    /// Drop every cached chunk.
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.lock().await.clear();
        }
    }

    /// Answer a bounding-box query.
    ///
    /// `bounds` may have negative width or height. The result is never
    /// empty because of missing data: before the descriptor is ready, and
    /// for queries outside the dataset, a single placeholder is returned.
    #[instrument(skip(self), fields(locator = %self.inner.locator))]
    pub async fn spatial_query(&self, bounds: GeoRect, level: Option<DetailLevel>) -> FeatureCursor {
        let Some(descriptor) = self.descriptor() else {
            debug!(state = self.state().as_str(), "Query before descriptor is ready");
            return FeatureCursor::single(Feature::unknown_placeholder());
        };

        match plan_query(&descriptor, &bounds, level, &self.inner.config) {
            QueryPlan::Overview => {
                FeatureCursor::from_features(overview_features(&descriptor, self.inner.config.overview))
            }
            QueryPlan::Placeholder(reason) => {
                debug!(reason = reason.as_str(), "Answering with bounds placeholder");
                FeatureCursor::single(Feature::bounds_placeholder(descriptor.bounds_rect()))
            }
            QueryPlan::Fetch { range, requests } => {
                self.fetch_features(&descriptor, range, requests).await
            }
        }
    }

    async fn fetch_features(
        &self,
        descriptor: &GridDescriptor,
        range: ChunkRange,
        requests: Vec<ChunkRequest>,
    ) -> FeatureCursor {
        let selected = requests.len();

        let results: Vec<(ChunkRequest, Result<Arc<Chunk>>)> = stream::iter(requests)
            .map(|request| async move {
                let result = self.load_chunk(&request).await;
                (request, result)
            })
            .buffer_unordered(self.inner.config.max_concurrent_fetches)
            .collect()
            .await;

        let mut builder = FeatureSequenceBuilder::new(descriptor.chunk_size);
        let mut failed = 0usize;

        for (request, result) in results {
            match result {
                Ok(chunk) => builder.push(LocatedChunk::new(request.row, request.col, chunk)),
                Err(e) => {
                    failed += 1;
                    warn!(
                        file = %request.file,
                        row = request.row,
                        col = request.col,
                        error = %e,
                        "Failed to load chunk, omitting its features"
                    );
                }
            }
        }

        debug!(
            cols = ?(range.col0, range.col1),
            rows = ?(range.row0, range.row1),
            selected,
            fetched = builder.len(),
            failed,
            "Spatial query resolved"
        );

        builder.build()
    }

    async fn load_chunk(&self, request: &ChunkRequest) -> Result<Arc<Chunk>> {
        let key = (request.row, request.col);

        if let Some(cache) = &self.inner.cache {
            if let Some(chunk) = cache.lock().await.get(&key) {
                return Ok(chunk);
            }
        }

        let chunk = Arc::new(self.inner.chunks.fetch(request).await?);

        if let Some(cache) = &self.inner.cache {
            cache.lock().await.insert(key, chunk.clone());
        }

        Ok(chunk)
    }
}

impl fmt::Debug for SpatialGridStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialGridStore")
            .field("locator", &self.inner.locator)
            .field("state", &self.state().as_str())
            .field("cache", &self.inner.cache.is_some())
            .finish()
    }
}

#[async_trait]
impl FeatureStore for SpatialGridStore {
    async fn spatial_query(&self, bounds: GeoRect, level: Option<DetailLevel>) -> FeatureCursor {
        SpatialGridStore::spatial_query(self, bounds, level).await
    }

    fn bounds(&self) -> Option<GeoRect> {
        SpatialGridStore::bounds(self)
    }

    async fn add(&self, _feature: Feature) -> Result<FeatureId> {
        Err(ChunkStoreError::Unsupported("add"))
    }

    async fn put(&self, _feature: Feature) -> Result<FeatureId> {
        Err(ChunkStoreError::Unsupported("put"))
    }

    async fn get(&self, _id: &FeatureId) -> Result<Option<Feature>> {
        Err(ChunkStoreError::Unsupported("get"))
    }

    async fn remove(&self, _id: &FeatureId) -> Result<bool> {
        Err(ChunkStoreError::Unsupported("remove"))
    }

    async fn query(&self, _level: Option<DetailLevel>) -> Result<FeatureCursor> {
        Err(ChunkStoreError::Unsupported("query"))
    }
}
