//! Stored bounding-extent maintenance.
//!
//! Each mutated entity is its own affected entity. On commit the merged
//! dirty region is reprojected into the entity's stored native extent,
//! which is grown to include it and saved back. Deletes never grow an
//! extent, so only inserts and updates are collected.

use crate::core::{DirtyRegionError, ReferenceSystem, Result, SpatialExtent};
use crate::observer::{
    AffectedEntityResolver, ChangeHandler, MutationObserver, ObserverConfig, ReprojectingMerger,
};
use crate::transaction::{AffectedEntity, OperationKind};
use crate::transform::{DEFAULT_DENSIFY_POINTS, MAX_DENSIFY_POINTS, TransformRegistry};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Default namespace of the bounds maintenance consumer
pub const BOUNDS_NAMESPACE: &str = "bounds-update";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Catalog storage error: {0}")]
    Storage(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Persistent store of entities' native extents
pub trait ExtentCatalog: Send + Sync {
    /// Stored native extent, `None` if the entity does not exist
    fn load(&self, entity_id: &str) -> CatalogResult<Option<SpatialExtent>>;

    fn save(&self, entity_id: &str, extent: SpatialExtent) -> CatalogResult<()>;
}

/// Every catalogued entity is affected by its own mutations
pub struct IdentityResolver {
    catalog: Arc<dyn ExtentCatalog>,
}

impl IdentityResolver {
    pub fn new(catalog: Arc<dyn ExtentCatalog>) -> Self {
        Self { catalog }
    }

    fn load(&self, entity_id: &str) -> Result<Option<SpatialExtent>> {
        self.catalog
            .load(entity_id)
            .map_err(|e| DirtyRegionError::Resolution(e.to_string()))
    }
}

impl AffectedEntityResolver for IdentityResolver {
    fn resolve(&self, source_entity: &str) -> Result<BTreeSet<AffectedEntity>> {
        match self.load(source_entity)? {
            Some(_) => Ok(BTreeSet::from([AffectedEntity::from(source_entity)])),
            None => Ok(BTreeSet::new()),
        }
    }

    fn target_reference_system(&self, entity: &AffectedEntity) -> Result<ReferenceSystem> {
        match self.load(entity.as_str())? {
            Some(stored) => Ok(stored.reference_system().horizontal_component()),
            None => Err(DirtyRegionError::Resolution(format!(
                "entity '{}' was removed before its bounds could be updated",
                entity
            ))),
        }
    }
}

/// Grows the stored native extent to include the merged dirty region
pub struct BoundsUpdater {
    catalog: Arc<dyn ExtentCatalog>,
    transforms: Arc<TransformRegistry>,
    densify_points: usize,
}

impl BoundsUpdater {
    pub fn new(catalog: Arc<dyn ExtentCatalog>, transforms: Arc<TransformRegistry>) -> Self {
        Self {
            catalog,
            transforms,
            densify_points: DEFAULT_DENSIFY_POINTS,
        }
    }

    /// Set the boundary sample budget, clamped to [`MAX_DENSIFY_POINTS`]
    pub fn densify_points(mut self, points: usize) -> Self {
        self.densify_points = points.min(MAX_DENSIFY_POINTS);
        self
    }
}

impl ChangeHandler for BoundsUpdater {
    fn apply(&self, entity: &AffectedEntity, merged: &SpatialExtent) -> Result<()> {
        let stored = self
            .catalog
            .load(entity.as_str())
            .map_err(|e| DirtyRegionError::Dispatch(e.to_string()))?;
        let Some(stored) = stored else {
            warn!(
                "entity '{}' no longer exists, bounds not updated with {}",
                entity, merged
            );
            return Ok(());
        };

        let dirty = self
            .transforms
            .reproject(merged, stored.reference_system(), self.densify_points)?;
        let updated = expand_stored(&stored, &dirty)?;
        debug!("bounds of '{}' grow from {} to {}", entity, stored, updated);

        self.catalog
            .save(entity.as_str(), updated)
            .map_err(|e| DirtyRegionError::Dispatch(format!("saving bounds of '{}': {}", entity, e)))
    }
}

/// Grow `stored` horizontally by the 2D `dirty` extent. A 3D stored extent
/// keeps its vertical range.
fn expand_stored(stored: &SpatialExtent, dirty: &SpatialExtent) -> Result<SpatialExtent> {
    let horizontal = stored.to_horizontal().union(dirty)?;
    match stored.vertical() {
        None => Ok(horizontal),
        Some((min_z, max_z)) => SpatialExtent::new_3d(
            (horizontal.min_x(), horizontal.min_y(), min_z),
            (horizontal.max_x(), horizontal.max_y(), max_z),
            stored.reference_system().clone(),
        ),
    }
}

/// Observer wired for bounds maintenance under [`BOUNDS_NAMESPACE`]
pub fn bounds_update_observer(
    catalog: Arc<dyn ExtentCatalog>,
    transforms: Arc<TransformRegistry>,
) -> Result<MutationObserver> {
    let config = ObserverConfig::new(BOUNDS_NAMESPACE)
        .operations([OperationKind::Insert, OperationKind::Update]);
    bounds_update_observer_with_config(config, catalog, transforms)
}

pub fn bounds_update_observer_with_config(
    config: ObserverConfig,
    catalog: Arc<dyn ExtentCatalog>,
    transforms: Arc<TransformRegistry>,
) -> Result<MutationObserver> {
    let merger = ReprojectingMerger::new(transforms.clone()).densify_points(config.densify_points);
    let updater = BoundsUpdater::new(catalog.clone(), transforms).densify_points(config.densify_points);
    MutationObserver::new(
        config,
        Arc::new(IdentityResolver::new(catalog)),
        Arc::new(merger),
        Arc::new(updater),
    )
}
