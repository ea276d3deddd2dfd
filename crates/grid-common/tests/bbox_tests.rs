//! Tests for BoundingBox and GeoRect operations.

use grid_common::bbox::{BoundingBox, GeoRect};

// ============================================================================
// Construction and serialization
// ============================================================================

#[test]
fn test_from_array_uses_descriptor_order() {
    let bbox = BoundingBox::from_array([4.0, 52.0, 5.0, 53.0]);
    assert_eq!(bbox.min_lon, 4.0);
    assert_eq!(bbox.min_lat, 52.0);
    assert_eq!(bbox.max_lon, 5.0);
    assert_eq!(bbox.max_lat, 53.0);
}

#[test]
fn test_bbox_serde_field_names() {
    let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_value(bbox).unwrap();
    assert_eq!(json["min_lon"], 1.0);
    assert_eq!(json["max_lat"], 4.0);
}

// ============================================================================
// Normalization of origin + extent rectangles
// ============================================================================

#[test]
fn test_rect_positive_extent() {
    let bbox = GeoRect::new(4.9, 0.2, 5.1, 0.2).normalized();
    assert!((bbox.min_lon - 4.9).abs() < 1e-12);
    assert!((bbox.max_lon - 5.1).abs() < 1e-12);
    assert!((bbox.min_lat - 5.1).abs() < 1e-12);
    assert!((bbox.max_lat - 5.3).abs() < 1e-12);
}

#[test]
fn test_rect_negative_extent() {
    let bbox = GeoRect::new(10.0, -4.0, 8.0, -2.0).normalized();
    assert_eq!(bbox, BoundingBox::new(6.0, 6.0, 10.0, 8.0));
}

#[test]
fn test_rect_mixed_sign_extent() {
    let bbox = GeoRect::new(1.0, 2.0, 5.0, -3.0).normalized();
    assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 5.0));
}

#[test]
fn test_rect_nan_in_any_component() {
    assert!(!GeoRect::new(1.0, 1.0, 1.0, 1.0).has_nan());
    assert!(GeoRect::new(f64::NAN, 1.0, 1.0, 1.0).has_nan());
    assert!(GeoRect::new(1.0, f64::NAN, 1.0, 1.0).has_nan());
    assert!(GeoRect::new(1.0, 1.0, f64::NAN, 1.0).has_nan());
    assert!(GeoRect::new(1.0, 1.0, 1.0, f64::NAN).has_nan());
}

#[test]
fn test_rect_nan_extent_is_lost_by_normalization() {
    let bbox = GeoRect::new(1.0, f64::NAN, 1.0, 1.0).normalized();
    assert!(bbox.is_finite());
}

#[test]
fn test_rect_from_bbox() {
    let rect: GeoRect = BoundingBox::new(0.0, 0.0, 10.0, 5.0).into();
    assert_eq!(rect, GeoRect::new(0.0, 10.0, 0.0, 5.0));
}

// ============================================================================
// Clamping
// ============================================================================

#[test]
fn test_clamp_inside() {
    let grid = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let query = BoundingBox::new(2.0, 3.0, 4.0, 5.0);
    assert_eq!(query.clamp_to(&grid), query);
}

#[test]
fn test_clamp_partial_overlap() {
    let grid = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let query = BoundingBox::new(-5.0, 8.0, 5.0, 20.0);
    assert_eq!(query.clamp_to(&grid), BoundingBox::new(0.0, 8.0, 5.0, 10.0));
}

#[test]
fn test_clamp_outside_is_degenerate() {
    let grid = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let west = BoundingBox::new(-20.0, 0.0, -10.0, 10.0);
    let north = BoundingBox::new(0.0, 11.0, 10.0, 12.0);

    assert!(west.clamp_to(&grid).is_degenerate());
    assert!(north.clamp_to(&grid).is_degenerate());
}

// ============================================================================
// Expansion and finiteness
// ============================================================================

#[test]
fn test_expand_per_axis() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).expand(2.5, 1.0);
    assert_eq!(bbox, BoundingBox::new(-2.5, -1.0, 12.5, 11.0));
}

#[test]
fn test_non_finite_detected() {
    assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_finite());
    assert!(!BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    assert!(!BoundingBox::new(0.0, 0.0, f64::INFINITY, 1.0).is_finite());
}
