// ============================================================================
// dirtyregion Library
// ============================================================================
//
// Transaction-scoped dirty-region engine: collects the spatial extent of
// every mutation a consumer cares about, and on commit merges them per
// affected entity and runs the consumer's side effect exactly once.
//
// ============================================================================

pub mod consumers;
pub mod core;
pub mod observer;
pub mod transaction;
pub mod transform;

// Re-export main types for convenience
pub use crate::core::{DirtyRegionError, ReferenceSystem, Result, SpatialExtent};
pub use observer::{
    AffectedEntityResolver, ChangeHandler, DispatchReport, ListenerRegistry, MutationObserver,
    ObserverConfig, RegionMerger, ReprojectingMerger, TransactionListener,
};
pub use transaction::{
    AffectedEntity, AffectedRecords, DirtyRegionStore, FeatureSet, LifecyclePhase,
    MutationNotification, OperationKind, TransactionContext, TransactionId,
};
pub use transform::{CoordinateTransform, TransformRegistry};

use std::sync::Arc;

/// Build the two standard consumers and install them into a registry
///
/// # Examples
///
/// ```
/// use std::collections::{BTreeSet, HashMap};
/// use std::sync::{Arc, Mutex};
/// use dirtyregion::consumers::{CacheResult, CacheTruncator, CatalogResult, ExtentCatalog, SegmentRegistry};
/// use dirtyregion::{MutationNotification, ReferenceSystem, SpatialExtent, TransactionContext};
///
/// struct Layers;
/// impl SegmentRegistry for Layers {
///     fn segments_depending_on(&self, name: &str) -> CacheResult<BTreeSet<String>> {
///         Ok(BTreeSet::from([format!("{}@EPSG:4326", name)]))
///     }
///     fn declared_reference_system(&self, _segment: &str) -> CacheResult<ReferenceSystem> {
///         Ok(ReferenceSystem::wgs84())
///     }
/// }
///
/// #[derive(Default)]
/// struct Truncations(Mutex<Vec<String>>);
/// impl CacheTruncator for Truncations {
///     fn truncate(&self, segment: &str, _extent: &SpatialExtent) -> CacheResult<()> {
///         self.0.lock().unwrap().push(segment.to_string());
///         Ok(())
///     }
/// }
///
/// #[derive(Default)]
/// struct Catalog(Mutex<HashMap<String, SpatialExtent>>);
/// impl ExtentCatalog for Catalog {
///     fn load(&self, id: &str) -> CatalogResult<Option<SpatialExtent>> {
///         Ok(self.0.lock().unwrap().get(id).cloned())
///     }
///     fn save(&self, id: &str, extent: SpatialExtent) -> CatalogResult<()> {
///         self.0.lock().unwrap().insert(id.to_string(), extent);
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let truncations = Arc::new(Truncations::default());
/// let catalog = Arc::new(Catalog::default());
/// catalog.save("topp:roads", SpatialExtent::new(0.0, 0.0, 1.0, 1.0, ReferenceSystem::wgs84())?)?;
///
/// let listeners = dirtyregion::standard_listeners(Arc::new(Layers), truncations.clone(), catalog.clone())?;
///
/// let mut ctx = TransactionContext::new();
/// let inserted = SpatialExtent::new(5.0, 5.0, 6.0, 6.0, ReferenceSystem::wgs84())?;
/// listeners.data_store_change(&mut ctx, &MutationNotification::pre_insert("topp:roads", &inserted));
/// listeners.after_transaction(&mut ctx, true);
///
/// assert_eq!(*truncations.0.lock().unwrap(), vec!["topp:roads@EPSG:4326"]);
/// assert_eq!(catalog.load("topp:roads")?.unwrap().max_x(), 6.0);
/// # Ok(())
/// # }
/// ```
pub fn standard_listeners(
    segments: Arc<dyn consumers::SegmentRegistry>,
    truncator: Arc<dyn consumers::CacheTruncator>,
    catalog: Arc<dyn consumers::ExtentCatalog>,
) -> Result<ListenerRegistry> {
    let transforms = Arc::new(TransformRegistry::with_default_transforms());
    let cache = consumers::cache_invalidation_observer(segments, truncator, transforms.clone())?;
    let bounds = consumers::bounds_update_observer(catalog, transforms)?;

    let mut registry = ListenerRegistry::new();
    registry.register(Arc::new(cache));
    registry.register(Arc::new(bounds));
    Ok(registry)
}
