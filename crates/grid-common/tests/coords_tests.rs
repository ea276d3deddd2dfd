//! Round-trip and determinism checks for meter/degree conversions.

use grid_common::{
    lat_degrees_to_meters, lon_degrees_to_meters, meters_to_lat_degrees, meters_to_lon_degrees,
};
use test_utils::assert_approx_eq;

#[test]
fn test_latitude_round_trip() {
    for degrees in [0.0, 1e-6, 0.25, -3.5, 45.0] {
        let meters = lat_degrees_to_meters(degrees);
        assert_approx_eq!(meters_to_lat_degrees(meters), degrees, 1e-12);
    }
}

#[test]
fn test_longitude_round_trip_at_fixed_latitude() {
    for latitude in [0.0, 38.5, -52.37, 80.0] {
        for degrees in [1e-5, 0.1, -2.0] {
            let meters = lon_degrees_to_meters(degrees, latitude);
            assert_approx_eq!(meters_to_lon_degrees(meters, latitude), degrees, 1e-12);
        }
    }
}

#[test]
fn test_conversions_are_deterministic() {
    let a = meters_to_lon_degrees(1234.5, 52.37);
    let b = meters_to_lon_degrees(1234.5, 52.37);
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn test_one_kilometer_near_amsterdam() {
    // ~0.0147 degrees of longitude per km at 52.37° N
    assert_approx_eq!(meters_to_lon_degrees(1000.0, 52.37), 0.014713, 1e-6);
    assert_approx_eq!(meters_to_lat_degrees(1000.0), 0.0089832, 1e-6);
}
