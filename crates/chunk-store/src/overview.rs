//! Coarse features for queries below the detail threshold.

use grid_common::{meters_to_lat_degrees, meters_to_lon_degrees};

use crate::config::OverviewMode;
use crate::features::{Feature, FeatureId, FeatureProperties, Geometry};
use crate::types::GridDescriptor;

/// Features for a below-threshold query.
pub fn overview_features(descriptor: &GridDescriptor, mode: OverviewMode) -> Vec<Feature> {
    match mode {
        OverviewMode::Bounds => vec![Feature::bounds_placeholder(descriptor.bounds_rect())],
        OverviewMode::Chunks => chunk_centers(descriptor),
    }
}

/// One point per populated chunk, placed at the chunk's center.
///
/// Slots without a lookup entry, and entries whose availability rate is
/// exactly zero, produce nothing.
pub fn chunk_centers(descriptor: &GridDescriptor) -> Vec<Feature> {
    let chunk_size = descriptor.chunk_size as f64;
    let half = chunk_size / 2.0;
    let mut features = Vec::new();

    for row in 0..descriptor.total_chunks_y {
        for col in 0..descriptor.total_chunks_x {
            let Some(entry) = descriptor.lookup_entry(row, col) else {
                continue;
            };
            if entry.availability_rate == Some(0.0) {
                continue;
            }

            let offset_x = col as f64 * chunk_size + half;
            let offset_y = row as f64 * chunk_size + half;

            let lon = descriptor.origin_lon + meters_to_lon_degrees(offset_x, descriptor.origin_lat);
            let lat = descriptor.origin_lat + meters_to_lat_degrees(offset_y);

            features.push(Feature {
                id: FeatureId::Overview { row, col },
                geometry: Geometry::Point { lon, lat },
                properties: FeatureProperties::Overview {
                    scale: descriptor.chunk_size,
                    availability_rate: entry.availability_rate,
                },
            });
        }
    }

    features
}
