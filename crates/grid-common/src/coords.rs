//! Conversions between local planar meter offsets and WGS84 degrees.
//!
//! Uses a spherical earth with the WGS84 equatorial radius. Longitude
//! offsets are scaled by `cos(latitude)` at the anchor latitude; latitude
//! offsets are latitude-independent.

/// WGS84 equatorial radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Below this `|cos(lat)|` the longitude conversion collapses to zero.
const MIN_COS_LAT: f64 = 1e-12;

/// Convert an eastward offset in meters to degrees of longitude at `latitude`.
///
/// At the poles a meter offset has no meaningful longitude equivalent; the
/// result there is `0.0` rather than an infinite or NaN delta.
pub fn meters_to_lon_degrees(meters: f64, latitude: f64) -> f64 {
    let cos_lat = latitude.to_radians().cos();
    if cos_lat.abs() < MIN_COS_LAT {
        return 0.0;
    }
    (meters / (EARTH_RADIUS_M * cos_lat)).to_degrees()
}

/// Convert a northward offset in meters to degrees of latitude.
pub fn meters_to_lat_degrees(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}

/// Inverse of [`meters_to_lon_degrees`] at the same anchor latitude.
pub fn lon_degrees_to_meters(degrees: f64, latitude: f64) -> f64 {
    degrees.to_radians() * EARTH_RADIUS_M * latitude.to_radians().cos()
}

/// Inverse of [`meters_to_lat_degrees`].
pub fn lat_degrees_to_meters(degrees: f64) -> f64 {
    degrees.to_radians() * EARTH_RADIUS_M
}
