//! Configuration for the chunked grid store.

use serde::{Deserialize, Serialize};

/// Configuration for a [`SpatialGridStore`](crate::SpatialGridStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkStoreConfig {
    /// Fraction of one chunk's angular size added on every side of a query
    /// before resolving chunk indices.
    pub tolerance: f64,

    /// Detail levels strictly below this return overview features instead
    /// of cells.
    pub overview_level_threshold: u32,

    /// What a below-threshold query returns.
    pub overview: OverviewMode,

    /// Upper bound on chunk fetches in flight for one query.
    pub max_concurrent_fetches: usize,

    /// Memory budget for parsed chunks in megabytes. 0 disables caching.
    pub chunk_cache_size_mb: usize,
}

impl Default for ChunkStoreConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            overview_level_threshold: 1,
            overview: OverviewMode::Bounds,
            max_concurrent_fetches: 32,
            chunk_cache_size_mb: 0,
        }
    }
}

impl ChunkStoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CHUNK_TOLERANCE") {
            if let Ok(tolerance) = val.parse() {
                config.tolerance = tolerance;
            }
        }

        if let Ok(val) = std::env::var("OVERVIEW_LEVEL_THRESHOLD") {
            if let Ok(level) = val.parse() {
                config.overview_level_threshold = level;
            }
        }

        if let Ok(val) = std::env::var("OVERVIEW_MODE") {
            config.overview = OverviewMode::from_str(&val);
        }

        if let Ok(val) = std::env::var("MAX_CONCURRENT_CHUNK_FETCHES") {
            if let Ok(n) = val.parse() {
                config.max_concurrent_fetches = n;
            }
        }

        if let Ok(val) = std::env::var("CHUNK_CACHE_SIZE_MB") {
            if let Ok(size) = val.parse() {
                config.chunk_cache_size_mb = size;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err("tolerance must be a finite value >= 0".to_string());
        }

        if self.max_concurrent_fetches == 0 {
            return Err("max_concurrent_fetches must be > 0".to_string());
        }

        Ok(())
    }

    /// Get the chunk cache size in bytes.
    pub fn chunk_cache_size_bytes(&self) -> usize {
        self.chunk_cache_size_mb * 1024 * 1024
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_overview(mut self, overview: OverviewMode) -> Self {
        self.overview = overview;
        self
    }

    pub fn with_chunk_cache_mb(mut self, size_mb: usize) -> Self {
        self.chunk_cache_size_mb = size_mb;
        self
    }
}

/// What a query below the detail threshold returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverviewMode {
    /// A single placeholder feature covering the dataset's bounding box.
    #[default]
    Bounds,
    /// One point feature per populated chunk, at the chunk's center.
    Chunks,
}

impl OverviewMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "chunks" | "parents" => Self::Chunks,
            _ => Self::Bounds,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bounds => "bounds",
            Self::Chunks => "chunks",
        }
    }
}

impl std::fmt::Display for OverviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
