//! Common types and utilities shared across the chunked grid crates.

pub mod bbox;
pub mod coords;

pub use bbox::{BoundingBox, GeoRect};
pub use coords::{
    lat_degrees_to_meters, lon_degrees_to_meters, meters_to_lat_degrees, meters_to_lon_degrees,
    EARTH_RADIUS_M,
};
