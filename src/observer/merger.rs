use super::RegionMerger;
use crate::core::{ReferenceSystem, Result, SpatialExtent};
use crate::transform::{DEFAULT_DENSIFY_POINTS, MAX_DENSIFY_POINTS, TransformRegistry};
use std::sync::Arc;

/// Merges dirty regions by reprojecting each into the target system and
/// expanding a running extent to include it.
///
/// The first reprojected extent seeds the result. A failed reprojection
/// fails the whole merge; a partial union is never returned.
#[derive(Debug, Clone)]
pub struct ReprojectingMerger {
    transforms: Arc<TransformRegistry>,
    densify_points: usize,
}

impl ReprojectingMerger {
    pub fn new(transforms: Arc<TransformRegistry>) -> Self {
        Self {
            transforms,
            densify_points: DEFAULT_DENSIFY_POINTS,
        }
    }

    /// Set the boundary sample budget, clamped to [`MAX_DENSIFY_POINTS`]
    pub fn densify_points(mut self, points: usize) -> Self {
        self.densify_points = points.min(MAX_DENSIFY_POINTS);
        self
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }
}

impl Default for ReprojectingMerger {
    fn default() -> Self {
        Self::new(Arc::new(TransformRegistry::with_default_transforms()))
    }
}

impl RegionMerger for ReprojectingMerger {
    fn merge(
        &self,
        target: &ReferenceSystem,
        extents: &[SpatialExtent],
    ) -> Result<Option<SpatialExtent>> {
        let mut merged: Option<SpatialExtent> = None;
        for extent in extents {
            let reprojected = self
                .transforms
                .reproject(extent, target, self.densify_points)?;
            match merged.as_mut() {
                Some(acc) => acc.expand_to_include(&reprojected)?,
                None => merged = Some(reprojected),
            }
        }
        Ok(merged)
    }
}
