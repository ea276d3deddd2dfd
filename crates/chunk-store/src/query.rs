//! Query planning: turning a geographic rectangle into the chunks to fetch.
//!
//! Planning is pure and synchronous. [`plan_query`] decides between a
//! placeholder, an overview, or a list of [`ChunkRequest`]s; the store then
//! executes the plan.

use grid_common::{BoundingBox, GeoRect};

use crate::chunk::ChunkRequest;
use crate::config::ChunkStoreConfig;
use crate::types::GridDescriptor;

/// Caller-supplied zoom indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DetailLevel(pub i32);

impl DetailLevel {
    /// True when this level is coarse enough to skip cell data.
    pub fn is_below(&self, threshold: u32) -> bool {
        i64::from(self.0) < i64::from(threshold)
    }
}

impl From<i32> for DetailLevel {
    fn from(level: i32) -> Self {
        Self(level)
    }
}

/// Inclusive chunk index range on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub col0: u32,
    pub col1: u32,
    pub row0: u32,
    pub row1: u32,
}

impl ChunkRange {
    /// Number of (row, col) slots covered.
    pub fn slot_count(&self) -> usize {
        (self.col1 - self.col0 + 1) as usize * (self.row1 - self.row0 + 1) as usize
    }

    /// Row-major iteration over every (row, col) in the range.
    pub fn slots(&self) -> impl Iterator<Item = (u32, u32)> {
        let (col0, col1) = (self.col0, self.col1);
        (self.row0..=self.row1).flat_map(move |row| (col0..=col1).map(move |col| (row, col)))
    }
}

/// Why a query answered with the bounds placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// The query rectangle contained NaN.
    InvalidQuery,
    /// The query does not overlap the dataset.
    OutsideBounds,
    /// Chunk indices could not be computed.
    NonFiniteRange,
    /// No chunk files exist in the resolved range.
    NoChunks,
}

impl PlaceholderReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidQuery => "invalid_query",
            Self::OutsideBounds => "outside_bounds",
            Self::NonFiniteRange => "non_finite_range",
            Self::NoChunks => "no_chunks",
        }
    }
}

/// What a query should produce.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Detail level below threshold.
    Overview,
    /// A single feature for the dataset's bounding box.
    Placeholder(PlaceholderReason),
    /// Fetch these chunks and materialize their cells.
    Fetch {
        range: ChunkRange,
        requests: Vec<ChunkRequest>,
    },
}

/// Plan a spatial query against a loaded descriptor.
pub fn plan_query(
    descriptor: &GridDescriptor,
    query: &GeoRect,
    level: Option<DetailLevel>,
    config: &ChunkStoreConfig,
) -> QueryPlan {
    // min/max drop NaN operands, so check before normalizing.
    if query.has_nan() {
        return QueryPlan::Placeholder(PlaceholderReason::InvalidQuery);
    }
    let normalized = query.normalized();

    if level.is_some_and(|l| l.is_below(config.overview_level_threshold)) {
        return QueryPlan::Overview;
    }

    let clamped = normalized.clamp_to(&descriptor.bbox());
    if clamped.is_degenerate() {
        return QueryPlan::Placeholder(PlaceholderReason::OutsideBounds);
    }

    let Some(range) = resolve_chunk_range(descriptor, &clamped, config.tolerance) else {
        return QueryPlan::Placeholder(PlaceholderReason::NonFiniteRange);
    };

    let requests = collect_requests(descriptor, &range);
    if requests.is_empty() {
        return QueryPlan::Placeholder(PlaceholderReason::NoChunks);
    }

    QueryPlan::Fetch { range, requests }
}

/// Resolve an already clamped rectangle into the chunk indices it touches,
/// after growing it by `tolerance` chunks on every side.
///
/// Returns `None` when the grid has no chunks or an index is not finite.
pub fn resolve_chunk_range(
    descriptor: &GridDescriptor,
    clamped: &BoundingBox,
    tolerance: f64,
) -> Option<ChunkRange> {
    if descriptor.total_chunks_x == 0 || descriptor.total_chunks_y == 0 {
        return None;
    }

    let bbox = descriptor.bbox();
    let lon_per_chunk = descriptor.lon_per_chunk();
    let lat_per_chunk = descriptor.lat_per_chunk();

    let expanded = clamped.expand(tolerance * lon_per_chunk, tolerance * lat_per_chunk);

    let start_col = ((expanded.min_lon - bbox.min_lon) / lon_per_chunk).floor();
    let end_col = ((expanded.max_lon - bbox.min_lon) / lon_per_chunk).floor();
    let start_row = ((expanded.min_lat - bbox.min_lat) / lat_per_chunk).floor();
    let end_row = ((expanded.max_lat - bbox.min_lat) / lat_per_chunk).floor();

    if ![start_col, end_col, start_row, end_row]
        .iter()
        .all(|v| v.is_finite())
    {
        return None;
    }

    let tx = descriptor.total_chunks_x;
    let ty = descriptor.total_chunks_y;

    Some(ChunkRange {
        col0: clamp_index(start_col.min(end_col), tx),
        col1: clamp_index(start_col.max(end_col), tx),
        row0: clamp_index(start_row.min(end_row), ty),
        row1: clamp_index(start_row.max(end_row), ty),
    })
}

/// Look up every slot in `range`, skipping slots without a chunk file.
pub fn collect_requests(descriptor: &GridDescriptor, range: &ChunkRange) -> Vec<ChunkRequest> {
    range
        .slots()
        .filter_map(|(row, col)| {
            descriptor
                .lookup_file(row, col)
                .map(|file| ChunkRequest::new(file, row, col))
        })
        .collect()
}

fn clamp_index(value: f64, total: u32) -> u32 {
    let max = total.saturating_sub(1) as f64;
    value.max(0.0).min(max) as u32
}
