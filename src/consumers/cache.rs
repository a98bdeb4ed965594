//! Tile-cache invalidation.
//!
//! Affected entities are cache segments (tile layers) depending on the
//! mutated source. On commit each segment is truncated over the merged
//! dirty region, expressed in the segment's declared reference system.

use crate::core::{DirtyRegionError, ReferenceSystem, Result, SpatialExtent};
use crate::observer::{
    AffectedEntityResolver, ChangeHandler, MutationObserver, ObserverConfig, ReprojectingMerger,
};
use crate::transaction::AffectedEntity;
use crate::transform::TransformRegistry;
use log::warn;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Default namespace of the cache invalidation consumer
pub const CACHE_NAMESPACE: &str = "tile-cache";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Cache segment '{0}' not found")]
    SegmentNotFound(String),

    #[error("Segment registry error: {0}")]
    Registry(String),

    #[error("Truncation failed: {0}")]
    Truncation(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Knows which cache segments are built from which source entities
pub trait SegmentRegistry: Send + Sync {
    fn segments_depending_on(&self, entity_name: &str) -> CacheResult<BTreeSet<String>>;

    fn declared_reference_system(&self, segment: &str) -> CacheResult<ReferenceSystem>;
}

/// Drops cached content of a segment inside an extent
pub trait CacheTruncator: Send + Sync {
    fn truncate(&self, segment: &str, extent: &SpatialExtent) -> CacheResult<()>;
}

/// Resolves a source entity to the segments depending on it
pub struct SegmentResolver {
    registry: Arc<dyn SegmentRegistry>,
}

impl SegmentResolver {
    pub fn new(registry: Arc<dyn SegmentRegistry>) -> Self {
        Self { registry }
    }
}

impl AffectedEntityResolver for SegmentResolver {
    fn resolve(&self, source_entity: &str) -> Result<BTreeSet<AffectedEntity>> {
        let segments = self
            .registry
            .segments_depending_on(source_entity)
            .map_err(|e| DirtyRegionError::Resolution(e.to_string()))?;
        Ok(segments.into_iter().map(AffectedEntity::from).collect())
    }

    fn target_reference_system(&self, entity: &AffectedEntity) -> Result<ReferenceSystem> {
        self.registry
            .declared_reference_system(entity.as_str())
            .map_err(|e| DirtyRegionError::Resolution(e.to_string()))
    }
}

/// Truncates a segment over the merged dirty region
pub struct TruncateHandler {
    truncator: Arc<dyn CacheTruncator>,
}

impl TruncateHandler {
    pub fn new(truncator: Arc<dyn CacheTruncator>) -> Self {
        Self { truncator }
    }
}

impl ChangeHandler for TruncateHandler {
    fn apply(&self, entity: &AffectedEntity, merged: &SpatialExtent) -> Result<()> {
        match self.truncator.truncate(entity.as_str(), merged) {
            Ok(()) => Ok(()),
            Err(CacheError::SegmentNotFound(segment)) => {
                warn!(
                    "cache segment '{}' no longer exists, skipping truncation of {}",
                    segment, merged
                );
                Ok(())
            }
            Err(err) => Err(DirtyRegionError::Dispatch(format!(
                "error truncating cache segment '{}' for transaction affected bounds {}: {}",
                entity, merged, err
            ))),
        }
    }
}

/// Observer wired for cache invalidation under [`CACHE_NAMESPACE`]
pub fn cache_invalidation_observer(
    registry: Arc<dyn SegmentRegistry>,
    truncator: Arc<dyn CacheTruncator>,
    transforms: Arc<TransformRegistry>,
) -> Result<MutationObserver> {
    cache_invalidation_observer_with_config(
        ObserverConfig::new(CACHE_NAMESPACE),
        registry,
        truncator,
        transforms,
    )
}

pub fn cache_invalidation_observer_with_config(
    config: ObserverConfig,
    registry: Arc<dyn SegmentRegistry>,
    truncator: Arc<dyn CacheTruncator>,
    transforms: Arc<TransformRegistry>,
) -> Result<MutationObserver> {
    let merger = ReprojectingMerger::new(transforms).densify_points(config.densify_points);
    MutationObserver::new(
        config,
        Arc::new(SegmentResolver::new(registry)),
        Arc::new(merger),
        Arc::new(TruncateHandler::new(truncator)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FailingTruncator(CacheError);

    impl CacheTruncator for FailingTruncator {
        fn truncate(&self, _segment: &str, _extent: &SpatialExtent) -> CacheResult<()> {
            Err(self.0.clone())
        }
    }

    #[derive(Default)]
    struct OneSegment(Mutex<Option<String>>);

    impl SegmentRegistry for OneSegment {
        fn segments_depending_on(&self, entity_name: &str) -> CacheResult<BTreeSet<String>> {
            *self.0.lock().unwrap() = Some(entity_name.to_string());
            Ok(BTreeSet::from([format!("{}-tiles", entity_name)]))
        }

        fn declared_reference_system(&self, segment: &str) -> CacheResult<ReferenceSystem> {
            Err(CacheError::SegmentNotFound(segment.to_string()))
        }
    }

    fn extent() -> SpatialExtent {
        SpatialExtent::new(0.0, 0.0, 1.0, 1.0, ReferenceSystem::wgs84()).unwrap()
    }

    #[test]
    fn test_missing_segment_is_tolerated() {
        let handler = TruncateHandler::new(Arc::new(FailingTruncator(CacheError::SegmentNotFound(
            "gone".into(),
        ))));
        assert!(handler.apply(&"gone".into(), &extent()).is_ok());
    }

    #[test]
    fn test_truncation_failure_is_a_dispatch_error() {
        let handler = TruncateHandler::new(Arc::new(FailingTruncator(CacheError::Truncation(
            "disk full".into(),
        ))));
        let err = handler.apply(&"roads".into(), &extent()).unwrap_err();
        assert!(matches!(err, DirtyRegionError::Dispatch(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_resolver_maps_registry() {
        let registry = Arc::new(OneSegment::default());
        let resolver = SegmentResolver::new(registry.clone());
        let affected = resolver.resolve("topp:roads").unwrap();
        assert_eq!(affected, BTreeSet::from([AffectedEntity::from("topp:roads-tiles")]));
        assert_eq!(registry.0.lock().unwrap().as_deref(), Some("topp:roads"));

        let err = resolver
            .target_reference_system(&"topp:roads-tiles".into())
            .unwrap_err();
        assert!(matches!(err, DirtyRegionError::Resolution(_)));
    }
}
