//! Chunked spatial grid store.
//!
//! Serves point features for a large raster of 1-meter cells without ever
//! holding the whole dataset in memory. The grid is split into square
//! chunks, each stored as a separately fetchable (usually gzip-compressed)
//! JSON file. A small descriptor records the grid geometry and a row/column
//! lookup of chunk file names.
//!
//! # Architecture
//!
//! ```text
//! SpatialGridStore::new(fetcher, "data/grid/meta.json", config)
//!      │
//!      └─► spawn: load_descriptor ──► StoreState::Ready / Failed
//!
//! spatial_query(bounds, level)
//!      │
//!      ├─► plan_query: normalize, clamp, expand by tolerance, resolve chunk range
//!      │
//!      ├─► ChunkFetcher::fetch for each selected chunk (concurrent)
//!      │         │
//!      │         ├─► ChunkCache hit: reuse parsed chunk
//!      │         │
//!      │         └─► fetch ─► gunzip ─► UTF-8 ─► JSON ─► Chunk
//!      │
//!      └─► FeatureSequenceBuilder ─► FeatureCursor (lazy, single pass)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use chunk_store::{ChunkStoreConfig, SpatialGridStore};
//! use grid_common::GeoRect;
//! use grid_storage::{HttpFetcher, HttpFetcherConfig};
//!
//! let fetcher = Arc::new(HttpFetcher::new(&HttpFetcherConfig::from_env())?);
//! let store = SpatialGridStore::open(
//!     fetcher,
//!     "https://example.com/grid/meta.json",
//!     ChunkStoreConfig::from_env(),
//! )
//! .await?;
//!
//! for feature in store.spatial_query(GeoRect::new(4.89, 0.01, 52.37, 0.01), None).await {
//!     println!("{}", feature.id);
//! }
//! ```

pub mod cache;
pub mod chunk;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod features;
pub mod overview;
pub mod query;
pub mod store;
pub mod types;

pub use cache::{ChunkCache, ChunkKey};
pub use chunk::{parse_chunk, ChunkFetcher, ChunkRequest};
pub use config::{ChunkStoreConfig, OverviewMode};
pub use descriptor::{base_path, chunk_locator, load_descriptor, parse_descriptor};
pub use error::{ChunkStoreError, Result};
pub use features::{
    materialize_cell, CellProperties, Feature, FeatureCursor, FeatureId, FeatureProperties,
    FeatureSequenceBuilder, Geometry, LocatedChunk,
};
pub use query::{plan_query, resolve_chunk_range, ChunkRange, DetailLevel, PlaceholderReason, QueryPlan};
pub use store::{FeatureStore, SpatialGridStore, StoreState};
pub use types::{CacheStats, Cell, Chunk, GridDescriptor, LookupEntry};
