//! Feature materialization.
//!
//! Fetched chunks are handed to a [`FeatureSequenceBuilder`], which yields a
//! [`FeatureCursor`]: a lazy, single-pass iterator that turns available cells
//! into geolocated point features only as the caller pulls them.

use std::fmt;
use std::sync::Arc;

use grid_common::{meters_to_lat_degrees, meters_to_lon_degrees, GeoRect};
use serde::{Serialize, Serializer};

use crate::types::{Cell, Chunk};

/// Feature identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    /// A grid cell, keyed by absolute column and row. Renders as `<col>_<row>`.
    Cell { col: u64, row: u64 },
    /// A chunk overview point. Renders as `p_<row>_<col>`.
    Overview { row: u32, col: u32 },
    /// The whole-dataset placeholder. Renders as `bounds`.
    Bounds,
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell { col, row } => write!(f, "{}_{}", col, row),
            Self::Overview { row, col } => write!(f, "p_{}_{}", row, col),
            Self::Bounds => f.write_str("bounds"),
        }
    }
}

impl Serialize for FeatureId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Feature geometry in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Point { lon: f64, lat: f64 },
    Rect(GeoRect),
    /// Extent not known yet.
    Unknown,
}

/// Properties of a cell feature: the cell's own fields plus its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellProperties {
    #[serde(flatten)]
    pub cell: Cell,
    /// Chunk row.
    pub gr: u32,
    /// Chunk column.
    pub gc: u32,
    /// Absolute grid row.
    pub row: u64,
    /// Absolute grid column.
    pub col: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureProperties {
    Cell(CellProperties),
    #[serde(rename_all = "camelCase")]
    Overview {
        scale: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        availability_rate: Option<f64>,
    },
    Placeholder,
}

/// A materialized feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    /// Placeholder covering the dataset's bounding box.
    pub fn bounds_placeholder(bounds: GeoRect) -> Self {
        Self {
            id: FeatureId::Bounds,
            geometry: Geometry::Rect(bounds),
            properties: FeatureProperties::Placeholder,
        }
    }

    /// Placeholder for a store whose extent is not known yet.
    pub fn unknown_placeholder() -> Self {
        Self {
            id: FeatureId::Bounds,
            geometry: Geometry::Unknown,
            properties: FeatureProperties::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == FeatureId::Bounds
    }

    /// Cell properties, for cell features.
    pub fn cell_properties(&self) -> Option<&CellProperties> {
        match &self.properties {
            FeatureProperties::Cell(props) => Some(props),
            _ => None,
        }
    }

    /// Render as a GeoJSON `Feature` object. Rect geometries become a closed
    /// polygon ring; unknown geometry becomes `null`.
    pub fn to_geojson(&self) -> serde_json::Value {
        let geometry = match self.geometry {
            Geometry::Point { lon, lat } => serde_json::json!({
                "type": "Point",
                "coordinates": [lon, lat],
            }),
            Geometry::Rect(rect) => {
                let b = rect.normalized();
                serde_json::json!({
                    "type": "Polygon",
                    "coordinates": [[
                        [b.min_lon, b.min_lat],
                        [b.max_lon, b.min_lat],
                        [b.max_lon, b.max_lat],
                        [b.min_lon, b.max_lat],
                        [b.min_lon, b.min_lat],
                    ]],
                })
            }
            Geometry::Unknown => serde_json::Value::Null,
        };

        let properties = match &self.properties {
            FeatureProperties::Placeholder => serde_json::json!({}),
            other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
        };

        serde_json::json!({
            "type": "Feature",
            "id": self.id.to_string(),
            "geometry": geometry,
            "properties": properties,
        })
    }
}

/// A parsed chunk together with its grid position.
#[derive(Debug, Clone)]
pub struct LocatedChunk {
    pub row: u32,
    pub col: u32,
    pub chunk: Arc<Chunk>,
}

impl LocatedChunk {
    pub fn new(row: u32, col: u32, chunk: Arc<Chunk>) -> Self {
        Self { row, col, chunk }
    }
}

/// Build the feature for the cell at `index` of a located chunk.
///
/// Returns `None` for unavailable cells and out-of-range indices.
pub fn materialize_cell(located: &LocatedChunk, index: usize, chunk_size: u32) -> Option<Feature> {
    let chunk = &located.chunk;
    let cell = chunk.cells.get(index)?;
    if !cell.a || chunk.width == 0 {
        return None;
    }

    let width = chunk.width as usize;
    let local_row = (index / width) as u64;
    let local_col = (index % width) as u64;

    let row = located.row as u64 * chunk_size as u64 + local_row;
    let col = located.col as u64 * chunk_size as u64 + local_col;

    let lon = chunk.lon + meters_to_lon_degrees(local_col as f64, chunk.lat);
    let lat = chunk.lat + meters_to_lat_degrees(local_row as f64);

    Some(Feature {
        id: FeatureId::Cell { col, row },
        geometry: Geometry::Point { lon, lat },
        properties: FeatureProperties::Cell(CellProperties {
            cell: cell.clone(),
            gr: located.row,
            gc: located.col,
            row,
            col,
        }),
    })
}

/// Collects fetched chunks and turns them into a [`FeatureCursor`].
#[derive(Debug, Default)]
pub struct FeatureSequenceBuilder {
    chunk_size: u32,
    chunks: Vec<LocatedChunk>,
}

impl FeatureSequenceBuilder {
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunk_size,
            chunks: Vec::new(),
        }
    }

    pub fn push(&mut self, located: LocatedChunk) {
        self.chunks.push(located);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn build(self) -> FeatureCursor {
        FeatureCursor {
            inner: CursorInner::Cells(CellCursor {
                chunk_size: self.chunk_size,
                pending: self.chunks.into_iter(),
                current: None,
                index: 0,
            }),
        }
    }
}

impl Extend<LocatedChunk> for FeatureSequenceBuilder {
    fn extend<I: IntoIterator<Item = LocatedChunk>>(&mut self, iter: I) {
        self.chunks.extend(iter);
    }
}

/// Single-pass sequence of features returned by a query.
#[derive(Debug)]
pub struct FeatureCursor {
    inner: CursorInner,
}

#[derive(Debug)]
enum CursorInner {
    Cells(CellCursor),
    Features(std::vec::IntoIter<Feature>),
}

#[derive(Debug)]
struct CellCursor {
    chunk_size: u32,
    pending: std::vec::IntoIter<LocatedChunk>,
    current: Option<LocatedChunk>,
    index: usize,
}

impl FeatureCursor {
    /// A cursor over already built features.
    pub fn from_features(features: Vec<Feature>) -> Self {
        Self {
            inner: CursorInner::Features(features.into_iter()),
        }
    }

    /// A cursor yielding exactly one feature.
    pub fn single(feature: Feature) -> Self {
        Self::from_features(vec![feature])
    }
}

impl Iterator for FeatureCursor {
    type Item = Feature;

    fn next(&mut self) -> Option<Feature> {
        match &mut self.inner {
            CursorInner::Features(features) => features.next(),
            CursorInner::Cells(cells) => cells.next(),
        }
    }
}

impl CellCursor {
    fn next(&mut self) -> Option<Feature> {
        loop {
            if let Some(located) = &self.current {
                while self.index < located.chunk.cells.len() {
                    let index = self.index;
                    self.index += 1;
                    if let Some(feature) = materialize_cell(located, index, self.chunk_size) {
                        return Some(feature);
                    }
                }
            }

            self.current = Some(self.pending.next()?);
            self.index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_utils::assert_approx_eq;

    fn cell(a: bool) -> Cell {
        Cell {
            a,
            ..Cell::default()
        }
    }

    fn chunk(lon: f64, lat: f64, width: u32, cells: Vec<Cell>) -> Arc<Chunk> {
        let height = if width == 0 { 0 } else { cells.len() as u32 / width };
        Arc::new(Chunk {
            lon,
            lat,
            width,
            height,
            cells,
        })
    }

    #[test]
    fn test_feature_ids() {
        assert_eq!(FeatureId::Cell { col: 7, row: 3 }.to_string(), "7_3");
        assert_eq!(FeatureId::Overview { row: 1, col: 2 }.to_string(), "p_1_2");
        assert_eq!(FeatureId::Bounds.to_string(), "bounds");
    }

    #[test]
    fn test_materialize_cell_position() {
        let located = LocatedChunk::new(1, 2, chunk(4.0, 52.0, 3, vec![cell(true); 6]));

        // index 4 -> local row 1, col 1
        let feature = materialize_cell(&located, 4, 10).unwrap();
        assert_eq!(feature.id, FeatureId::Cell { col: 21, row: 11 });

        let props = feature.cell_properties().unwrap();
        assert_eq!((props.gr, props.gc, props.row, props.col), (1, 2, 11, 21));

        match feature.geometry {
            Geometry::Point { lon, lat } => {
                assert_approx_eq!(lon, 4.0 + meters_to_lon_degrees(1.0, 52.0), 1e-12);
                assert_approx_eq!(lat, 52.0 + meters_to_lat_degrees(1.0), 1e-12);
            }
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_materialize_skips_unavailable() {
        let located = LocatedChunk::new(0, 0, chunk(0.0, 0.0, 2, vec![cell(false), cell(true)]));
        assert!(materialize_cell(&located, 0, 2).is_none());
        assert!(materialize_cell(&located, 1, 2).is_some());
        assert!(materialize_cell(&located, 2, 2).is_none());
    }

    #[test]
    fn test_cursor_flattens_chunks_in_cell_order() {
        let mut builder = FeatureSequenceBuilder::new(2);
        builder.push(LocatedChunk::new(
            0,
            0,
            chunk(0.0, 0.0, 2, vec![cell(true), cell(false), cell(true), cell(true)]),
        ));
        builder.push(LocatedChunk::new(0, 1, chunk(0.1, 0.0, 1, vec![cell(false)])));
        builder.push(LocatedChunk::new(1, 1, chunk(0.1, 0.1, 1, vec![cell(true)])));
        assert_eq!(builder.len(), 3);

        let ids: Vec<String> = builder.build().map(|f| f.id.to_string()).collect();
        assert_eq!(ids, vec!["0_0", "0_1", "1_1", "2_2"]);
    }

    #[test]
    fn test_cursor_ids_unique() {
        let mut builder = FeatureSequenceBuilder::new(3);
        for row in 0..2 {
            for col in 0..2 {
                builder.push(LocatedChunk::new(row, col, chunk(0.0, 0.0, 3, vec![cell(true); 9])));
            }
        }

        let ids: Vec<FeatureId> = builder.build().map(|f| f.id).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), 36);
        assert_eq!(unique.len(), 36);
    }

    #[test]
    fn test_empty_builder_yields_nothing() {
        assert_eq!(FeatureSequenceBuilder::new(5).build().count(), 0);
    }

    #[test]
    fn test_single_cursor() {
        let mut cursor = FeatureCursor::single(Feature::unknown_placeholder());
        assert!(cursor.next().unwrap().is_placeholder());
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_geojson_point() {
        let located = LocatedChunk::new(
            0,
            0,
            chunk(
                5.0,
                0.0,
                1,
                vec![Cell {
                    a: true,
                    o: Some(9.into()),
                    min_h: Some(1.0),
                    max_h: None,
                }],
            ),
        );
        let json = materialize_cell(&located, 0, 4).unwrap().to_geojson();

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["id"], "0_0");
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["geometry"]["coordinates"][0], 5.0);
        assert_eq!(json["properties"]["a"], true);
        assert_eq!(json["properties"]["o"], 9);
        assert_eq!(json["properties"]["minH"], 1.0);
        assert_eq!(json["properties"]["gr"], 0);
        assert!(json["properties"].get("maxH").is_none());
    }

    #[test]
    fn test_geojson_placeholders() {
        let bounds = Feature::bounds_placeholder(GeoRect::new(0.0, 10.0, 0.0, 5.0)).to_geojson();
        assert_eq!(bounds["id"], "bounds");
        assert_eq!(bounds["geometry"]["type"], "Polygon");
        assert_eq!(bounds["geometry"]["coordinates"][0].as_array().unwrap().len(), 5);
        assert_eq!(bounds["properties"], serde_json::json!({}));

        let unknown = Feature::unknown_placeholder().to_geojson();
        assert!(unknown["geometry"].is_null());
    }

    #[test]
    fn test_overview_properties_serialize_camel_case() {
        let props = FeatureProperties::Overview {
            scale: 100,
            availability_rate: Some(0.5),
        };
        let value = serde_json::to_value(props).unwrap();
        assert_eq!(value["scale"], 100);
        assert_eq!(value["availabilityRate"], 0.5);
    }
}
