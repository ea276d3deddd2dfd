//! Grid descriptor fixtures.

use serde_json::{json, Value};

/// Common bounding boxes as `[minLon, minLat, maxLon, maxLat]`.
pub mod bbox {
    /// 10x10 degree square at the origin; easy index arithmetic.
    pub const UNIT_TEN: [f64; 4] = [0.0, 0.0, 10.0, 10.0];

    /// Roughly 200 x 200 meters in central Amsterdam.
    pub const AMSTERDAM: [f64; 4] = [4.8900, 52.3700, 4.892_944, 52.371_797];

    /// Near the north pole, where longitude scaling breaks down.
    pub const POLAR: [f64; 4] = [0.0, 89.9, 1.0, 89.99];
}

/// A synthetic grid layout: geometry plus a chunk lookup table.
///
/// Every slot starts populated with `c_<row>_<col>.json.gz`; use
/// [`without_chunk`](Self::without_chunk) to punch holes.
#[derive(Debug, Clone)]
pub struct GridFixture {
    pub bbox: [f64; 4],
    pub chunks_x: u32,
    pub chunks_y: u32,
    pub chunk_size: u32,
    pub lookup: Vec<Vec<Option<String>>>,
}

impl GridFixture {
    pub fn new(bbox: [f64; 4], chunks_x: u32, chunks_y: u32, chunk_size: u32) -> Self {
        let lookup = (0..chunks_y)
            .map(|row| {
                (0..chunks_x)
                    .map(|col| Some(Self::file_name(row, col)))
                    .collect()
            })
            .collect();

        Self {
            bbox,
            chunks_x,
            chunks_y,
            chunk_size,
            lookup,
        }
    }

    /// Default file name for a chunk slot.
    pub fn file_name(row: u32, col: u32) -> String {
        format!("c_{}_{}.json.gz", row, col)
    }

    /// Remove the lookup entry at (row, col).
    pub fn without_chunk(mut self, row: u32, col: u32) -> Self {
        if let Some(slot) = self
            .lookup
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        {
            *slot = None;
        }
        self
    }

    /// Populated slots as (row, col, file), row-major.
    pub fn files(&self) -> Vec<(u32, u32, String)> {
        let mut files = Vec::new();
        for (row, entries) in self.lookup.iter().enumerate() {
            for (col, entry) in entries.iter().enumerate() {
                if let Some(file) = entry {
                    files.push((row as u32, col as u32, file.clone()));
                }
            }
        }
        files
    }

    /// Bottom-left corner of a chunk, spacing chunks evenly across the bbox.
    pub fn chunk_origin(&self, row: u32, col: u32) -> (f64, f64) {
        let lon_per = (self.bbox[2] - self.bbox[0]) / self.chunks_x as f64;
        let lat_per = (self.bbox[3] - self.bbox[1]) / self.chunks_y as f64;
        (
            self.bbox[0] + col as f64 * lon_per,
            self.bbox[1] + row as f64 * lat_per,
        )
    }

    /// The descriptor document for this layout.
    pub fn descriptor_json(&self) -> Value {
        let lookup: Vec<Vec<Value>> = self
            .lookup
            .iter()
            .map(|row| {
                row.iter()
                    .map(|entry| match entry {
                        Some(file) => json!({ "file": file, "availability_rate": 1.0 }),
                        None => Value::Null,
                    })
                    .collect()
            })
            .collect();

        json!({
            "originLon": self.bbox[0],
            "originLat": self.bbox[1],
            "width": self.chunks_x * self.chunk_size,
            "height": self.chunks_y * self.chunk_size,
            "chunkSize": self.chunk_size,
            "totalChunksX": self.chunks_x,
            "totalChunksY": self.chunks_y,
            "boundingBox": self.bbox,
            "lookup": lookup,
        })
    }
}
