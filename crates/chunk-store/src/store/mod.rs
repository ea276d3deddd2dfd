//! Store interface and lifecycle state.

mod spatial;

pub use spatial::SpatialGridStore;

use std::sync::Arc;

use async_trait::async_trait;
use grid_common::GeoRect;

use crate::error::Result;
use crate::features::{Feature, FeatureCursor, FeatureId};
use crate::query::DetailLevel;
use crate::types::GridDescriptor;

/// Lifecycle of a store. Leaves `Loading` exactly once; `Ready` and
/// `Failed` are terminal.
#[derive(Debug, Clone)]
pub enum StoreState {
    Loading,
    Ready(Arc<GridDescriptor>),
    Failed(String),
}

impl StoreState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The descriptor, once ready.
    pub fn descriptor(&self) -> Option<&Arc<GridDescriptor>> {
        match self {
            Self::Ready(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// A read-only source of features answering bounding-box queries.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Features in or near `bounds`. Never fails: unavailable data yields a
    /// placeholder feature.
    async fn spatial_query(&self, bounds: GeoRect, level: Option<DetailLevel>) -> FeatureCursor;

    /// Overall extent, `None` until ready.
    fn bounds(&self) -> Option<GeoRect>;

    async fn add(&self, feature: Feature) -> Result<FeatureId>;

    async fn put(&self, feature: Feature) -> Result<FeatureId>;

    async fn get(&self, id: &FeatureId) -> Result<Option<Feature>>;

    async fn remove(&self, id: &FeatureId) -> Result<bool>;

    /// Unfiltered query over the whole store.
    async fn query(&self, level: Option<DetailLevel>) -> Result<FeatureCursor>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        assert!(StoreState::Loading.is_loading());
        assert!(StoreState::Failed("boom".to_string()).is_failed());
        assert!(StoreState::Loading.descriptor().is_none());
        assert_eq!(StoreState::Failed(String::new()).as_str(), "failed");
    }
}
