//! Core data types: grid descriptor, chunks and cells.

use grid_common::{BoundingBox, GeoRect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Metadata describing a chunked grid.
///
/// Loaded once per store and never mutated afterwards. The bounding box is
/// authoritative for every geographic derivation; `width`/`height` are the
/// covered extent in meters and informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDescriptor {
    /// Longitude of the grid's bottom-left corner.
    pub origin_lon: f64,
    /// Latitude of the grid's bottom-left corner.
    pub origin_lat: f64,
    /// Covered extent east-west in meters.
    pub width: f64,
    /// Covered extent north-south in meters.
    pub height: f64,
    /// Cells per chunk edge.
    pub chunk_size: u32,
    pub total_chunks_x: u32,
    pub total_chunks_y: u32,
    /// `[minLon, minLat, maxLon, maxLat]` on the wire.
    #[serde(with = "bbox_array")]
    pub bounding_box: BoundingBox,
    /// Row-major chunk lookup, `total_chunks_y` rows of `total_chunks_x` entries.
    pub lookup: Vec<Vec<Option<LookupEntry>>>,
}

/// One entry of the chunk lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupEntry {
    /// Chunk file name, relative to the descriptor's directory.
    #[serde(default)]
    pub file: String,
    /// Fraction of available cells in the chunk, when the producer recorded it.
    #[serde(
        default,
        alias = "availabilityRate",
        skip_serializing_if = "Option::is_none"
    )]
    pub availability_rate: Option<f64>,
}

impl GridDescriptor {
    /// The dataset's bounding box in corner form.
    pub fn bbox(&self) -> BoundingBox {
        self.bounding_box
    }

    /// The dataset's extent as `[x, width, y, height]`.
    pub fn bounds_rect(&self) -> GeoRect {
        self.bounding_box.to_rect()
    }

    /// Angular width of one chunk.
    pub fn lon_per_chunk(&self) -> f64 {
        self.bounding_box.width() / self.total_chunks_x as f64
    }

    /// Angular height of one chunk.
    pub fn lat_per_chunk(&self) -> f64 {
        self.bounding_box.height() / self.total_chunks_y as f64
    }

    /// Lookup entry at (row, col), if the table has one.
    pub fn lookup_entry(&self, row: u32, col: u32) -> Option<&LookupEntry> {
        self.lookup
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .and_then(Option::as_ref)
    }

    /// Chunk file at (row, col). Missing entries and empty names mean no data.
    pub fn lookup_file(&self, row: u32, col: u32) -> Option<&str> {
        self.lookup_entry(row, col)
            .map(|entry| entry.file.as_str())
            .filter(|file| !file.is_empty())
    }

    /// True when `lookup` has exactly `total_chunks_y` rows of `total_chunks_x` entries.
    pub fn lookup_shape_matches(&self) -> bool {
        self.lookup.len() == self.total_chunks_y as usize
            && self
                .lookup
                .iter()
                .all(|row| row.len() == self.total_chunks_x as usize)
    }
}

/// A rectangular block of cells, fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Longitude of the chunk's bottom-left corner.
    pub lon: f64,
    /// Latitude of the chunk's bottom-left corner.
    pub lat: f64,
    /// Cell columns; may be less than the grid's chunk size at the east edge.
    pub width: u32,
    /// Cell rows; may be less than the grid's chunk size at the north edge.
    pub height: u32,
    /// Row-major cells, `index = row * width + col`.
    pub cells: Vec<Cell>,
}

impl Chunk {
    /// Number of cells implied by `width * height`.
    pub fn expected_cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the cell array matches the declared dimensions.
    pub fn validate(&self) -> Result<(), String> {
        if self.cells.len() != self.expected_cells() {
            return Err(format!(
                "chunk declares {}x{} cells but carries {}",
                self.width,
                self.height,
                self.cells.len()
            ));
        }
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err("chunk origin is not finite".to_string());
        }
        Ok(())
    }

    /// Number of cells with the availability flag set.
    pub fn available_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.a).count()
    }

    /// Rough in-memory size, used for cache accounting.
    pub fn estimated_size_bytes(&self) -> usize {
        std::mem::size_of::<Chunk>() + self.cells.len() * std::mem::size_of::<Cell>()
    }
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Availability flag. Unavailable cells produce no feature.
    #[serde(default, deserialize_with = "truthy")]
    pub a: bool,
    /// Owner id, kept as the producer wrote it; `0` or absent means unowned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<serde_json::Number>,
    /// Minimum height in meters.
    #[serde(
        default,
        rename = "minH",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_h: Option<f64>,
    /// Maximum height in meters.
    #[serde(
        default,
        rename = "maxH",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_h: Option<f64>,
}

impl Cell {
    /// Owner id, treating `0` as unowned.
    pub fn owner(&self) -> Option<&serde_json::Number> {
        self.o.as_ref().filter(|id| id.as_f64() != Some(0.0))
    }
}

/// Producers write the flag as a bool, a 0/1 number or null.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    })
}

mod bbox_array {
    use super::*;

    pub fn serialize<S: Serializer>(bbox: &BoundingBox, serializer: S) -> Result<S::Ok, S::Error> {
        [bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BoundingBox, D::Error> {
        let values = <[f64; 4]>::deserialize(deserializer)?;
        Ok(BoundingBox::from_array(values))
    }
}

/// Statistics for the chunk cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub memory_bytes: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
