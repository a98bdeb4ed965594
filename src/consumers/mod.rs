// ============================================================================
// Consumers
// ============================================================================
//
// Concrete capability sets plugged into `MutationObserver`:
// - cache: truncate tile-cache segments over the committed dirty region
// - bounds: grow stored native extents to include the committed dirty region
//
// ============================================================================

pub mod bounds;
pub mod cache;

pub use bounds::{
    BOUNDS_NAMESPACE, BoundsUpdater, CatalogError, CatalogResult, ExtentCatalog,
    IdentityResolver, bounds_update_observer, bounds_update_observer_with_config,
};
pub use cache::{
    CACHE_NAMESPACE, CacheError, CacheResult, CacheTruncator, SegmentRegistry, SegmentResolver,
    TruncateHandler, cache_invalidation_observer, cache_invalidation_observer_with_config,
};
