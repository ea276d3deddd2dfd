//! Bounding box types and operations.
//!
//! Two shapes are used throughout the workspace:
//!
//! - [`BoundingBox`]: corner form (`min_lon, min_lat, max_lon, max_lat`), the
//!   order used by grid descriptors on the wire.
//! - [`GeoRect`]: origin + extent form (`x, width, y, height`), the shape
//!   viewers send as a query and receive as the store's overall bounds.
//!   Width and height may be negative.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Build from the `[minLon, minLat, maxLon, maxLat]` array layout.
    pub fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Build from two arbitrary corners, ordering each axis.
    pub fn from_corners(lon_a: f64, lat_a: f64, lon_b: f64, lat_b: f64) -> Self {
        Self {
            min_lon: lon_a.min(lon_b),
            min_lat: lat_a.min(lat_b),
            max_lon: lon_a.max(lon_b),
            max_lat: lat_a.max(lat_b),
        }
    }

    /// Width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// True when min > max on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    /// True when every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.min_lon.is_finite()
            && self.min_lat.is_finite()
            && self.max_lon.is_finite()
            && self.max_lat.is_finite()
    }

    /// Clamp this box to `other` without checking for overlap.
    ///
    /// The result is degenerate (see [`is_degenerate`](Self::is_degenerate))
    /// when the two boxes do not overlap.
    pub fn clamp_to(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon.max(other.min_lon),
            min_lat: self.min_lat.max(other.min_lat),
            max_lon: self.max_lon.min(other.max_lon),
            max_lat: self.max_lat.min(other.max_lat),
        }
    }

    /// Grow each side by `d_lon` degrees east/west and `d_lat` degrees north/south.
    pub fn expand(&self, d_lon: f64, d_lat: f64) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon - d_lon,
            min_lat: self.min_lat - d_lat,
            max_lon: self.max_lon + d_lon,
            max_lat: self.max_lat + d_lat,
        }
    }

    /// Convert to origin + extent form.
    pub fn to_rect(&self) -> GeoRect {
        GeoRect::new(self.min_lon, self.width(), self.min_lat, self.height())
    }
}

/// A rectangle given as origin plus extent: `[x, width, y, height]`.
///
/// `x`/`width` run along longitude, `y`/`height` along latitude. Negative
/// extents are allowed and are resolved by [`GeoRect::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
}

impl GeoRect {
    pub fn new(x: f64, width: f64, y: f64, height: f64) -> Self {
        Self {
            x,
            width,
            y,
            height,
        }
    }

    /// True when any of the four components is NaN.
    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.width.is_nan() || self.y.is_nan() || self.height.is_nan()
    }

    /// Resolve into corner form, taking min/max of both corners on each axis.
    pub fn normalized(&self) -> BoundingBox {
        BoundingBox::from_corners(
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height,
        )
    }
}

impl From<BoundingBox> for GeoRect {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_disjoint_is_degenerate() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.clamp_to(&b).is_degenerate());
    }

    #[test]
    fn test_clamp_touching_edges_is_not_degenerate() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);

        let shared = a.clamp_to(&b);
        assert!(!shared.is_degenerate());
        assert_eq!(shared.min_lon, 10.0);
        assert_eq!(shared.max_lon, 10.0);
    }

    #[test]
    fn test_rect_round_trip() {
        let bbox = BoundingBox::new(-2.0, 1.0, 3.0, 4.0);
        let rect = bbox.to_rect();
        assert_eq!(rect, GeoRect::new(-2.0, 5.0, 1.0, 3.0));
        assert_eq!(rect.normalized(), bbox);
    }
}
