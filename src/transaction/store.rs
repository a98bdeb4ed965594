// ============================================================================
// Dirty Region Store
// ============================================================================
//
// Per-transaction map of pending extents, split by consumer namespace and
// then by affected entity. Lives inside the `TransactionContext` under
// `DIRTY_REGION_STORE_KEY`, so its lifetime is the transaction's.
//
// Namespace lifecycle:
// ```text
// Empty ──append──> Collecting ──take_for_dispatch──> Dispatched
// ```
// Rollback leaves the namespace untouched; the host drops it together
// with the context.
//
// ============================================================================

use super::context::TransactionContext;
use crate::core::{DirtyRegionError, Result, SpatialExtent};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Context key the store is kept under
pub const DIRTY_REGION_STORE_KEY: &str = "dirtyregion.store";

/// Consumer-specific identifier of something that reacts to a spatial change
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AffectedEntity(String);

impl AffectedEntity {
    pub fn new(name: impl Into<String>) -> Self {
        AffectedEntity(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AffectedEntity {
    fn from(name: &str) -> Self {
        AffectedEntity(name.to_string())
    }
}

impl From<String> for AffectedEntity {
    fn from(name: String) -> Self {
        AffectedEntity(name)
    }
}

impl fmt::Display for AffectedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceState {
    /// Nothing collected yet
    Empty,

    /// At least one dirty region is pending
    Collecting,

    /// Pending regions were handed over for merge and dispatch
    Dispatched,
}

impl fmt::Display for NamespaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceState::Empty => write!(f, "EMPTY"),
            NamespaceState::Collecting => write!(f, "COLLECTING"),
            NamespaceState::Dispatched => write!(f, "DISPATCHED"),
        }
    }
}

/// Pending dirty regions of one consumer namespace
#[derive(Debug, Clone)]
pub struct NamespaceRegions {
    state: NamespaceState,
    regions: BTreeMap<AffectedEntity, Vec<SpatialExtent>>,
}

impl NamespaceRegions {
    fn new() -> Self {
        Self {
            state: NamespaceState::Empty,
            regions: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> NamespaceState {
        self.state
    }

    /// Record one dirty region for `entity`. Duplicates are kept.
    ///
    /// # Errors
    /// Returns error once the namespace has been dispatched
    pub fn append(&mut self, entity: AffectedEntity, extent: SpatialExtent) -> Result<()> {
        if self.state == NamespaceState::Dispatched {
            return Err(DirtyRegionError::Dispatch(format!(
                "cannot record dirty region for '{}': namespace already dispatched",
                entity
            )));
        }
        self.regions.entry(entity).or_default().push(extent);
        self.state = NamespaceState::Collecting;
        Ok(())
    }

    pub fn entities(&self) -> impl Iterator<Item = &AffectedEntity> {
        self.regions.keys()
    }

    pub fn extents(&self, entity: &AffectedEntity) -> Option<&[SpatialExtent]> {
        self.regions.get(entity).map(Vec::as_slice)
    }

    /// Number of affected entities
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Hand over every pending region and move to `Dispatched`
    pub fn take_for_dispatch(&mut self) -> BTreeMap<AffectedEntity, Vec<SpatialExtent>> {
        self.state = NamespaceState::Dispatched;
        std::mem::take(&mut self.regions)
    }
}

/// All namespaces' pending dirty regions for one transaction
#[derive(Debug, Clone, Default)]
pub struct DirtyRegionStore {
    namespaces: HashMap<String, NamespaceRegions>,
}

impl DirtyRegionStore {
    /// Read the store of a transaction, if any mutation created one
    pub fn of(ctx: &TransactionContext) -> Option<&DirtyRegionStore> {
        ctx.get::<DirtyRegionStore>(DIRTY_REGION_STORE_KEY)
    }

    pub fn of_mut(ctx: &mut TransactionContext) -> Option<&mut DirtyRegionStore> {
        ctx.get_mut::<DirtyRegionStore>(DIRTY_REGION_STORE_KEY)
    }

    /// The transaction's store, created on first use
    pub fn attach(ctx: &mut TransactionContext) -> Result<&mut DirtyRegionStore> {
        ctx.get_or_insert_with(DIRTY_REGION_STORE_KEY, DirtyRegionStore::default)
    }

    pub fn for_namespace(&self, tag: &str) -> Option<&NamespaceRegions> {
        self.namespaces.get(tag)
    }

    pub fn for_namespace_mut(&mut self, tag: &str) -> Option<&mut NamespaceRegions> {
        self.namespaces.get_mut(tag)
    }

    /// The namespace's regions, created empty on first use
    pub fn namespace_entry(&mut self, tag: &str) -> &mut NamespaceRegions {
        self.namespaces
            .entry(tag.to_string())
            .or_insert_with(NamespaceRegions::new)
    }

    pub fn namespace_state(&self, tag: &str) -> NamespaceState {
        self.for_namespace(tag)
            .map(NamespaceRegions::state)
            .unwrap_or(NamespaceState::Empty)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReferenceSystem;

    fn extent(min_x: f64) -> SpatialExtent {
        SpatialExtent::new(min_x, 0.0, min_x + 1.0, 1.0, ReferenceSystem::wgs84()).unwrap()
    }

    #[test]
    fn test_namespace_lifecycle() {
        let mut ctx = TransactionContext::new();
        let store = DirtyRegionStore::attach(&mut ctx).unwrap();
        assert_eq!(store.namespace_state("cache"), NamespaceState::Empty);

        let regions = store.namespace_entry("cache");
        regions.append("layer".into(), extent(0.0)).unwrap();
        regions.append("layer".into(), extent(0.0)).unwrap();
        assert_eq!(regions.state(), NamespaceState::Collecting);
        assert_eq!(regions.extents(&"layer".into()).unwrap().len(), 2);

        let taken = regions.take_for_dispatch();
        assert_eq!(taken.len(), 1);
        assert_eq!(regions.state(), NamespaceState::Dispatched);
        assert!(regions.is_empty());
        assert!(regions.append("layer".into(), extent(1.0)).is_err());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let mut ctx = TransactionContext::new();
        {
            let store = DirtyRegionStore::attach(&mut ctx).unwrap();
            store
                .namespace_entry("cache")
                .append("topp:states".into(), extent(0.0))
                .unwrap();
            store
                .namespace_entry("bounds")
                .append("topp:states".into(), extent(5.0))
                .unwrap();
        }

        let store = DirtyRegionStore::of(&ctx).unwrap();
        let cache = store.for_namespace("cache").unwrap();
        let bounds = store.for_namespace("bounds").unwrap();
        assert_eq!(cache.extents(&"topp:states".into()).unwrap()[0].min_x(), 0.0);
        assert_eq!(bounds.extents(&"topp:states".into()).unwrap()[0].min_x(), 5.0);

        let mut tags: Vec<&str> = store.namespaces().collect();
        tags.sort();
        assert_eq!(tags, vec!["bounds", "cache"]);
    }

    #[test]
    fn test_store_is_per_context() {
        let mut first = TransactionContext::new();
        let second = TransactionContext::new();
        DirtyRegionStore::attach(&mut first)
            .unwrap()
            .namespace_entry("cache")
            .append("a".into(), extent(0.0))
            .unwrap();
        assert!(DirtyRegionStore::of(&first).is_some());
        assert!(DirtyRegionStore::of(&second).is_none());
    }
}
