// ============================================================================
// Mutation Observer
// ============================================================================
//
// One generic engine, three capabilities plugged in per consumer:
// - AffectedEntityResolver: which of the consumer's entities a mutation touches
// - RegionMerger: how pending extents combine into one
// - ChangeHandler: the consumer's side effect
//
// The engine collects during the transaction and dispatches once on commit.
//
// ============================================================================

pub mod config;
pub mod engine;
pub mod listener;
pub mod merger;

pub use config::ObserverConfig;
pub use engine::{DispatchReport, MutationObserver};
pub use listener::{ListenerRegistry, TransactionListener};
pub use merger::ReprojectingMerger;

use crate::core::{ReferenceSystem, Result, SpatialExtent};
use crate::transaction::AffectedEntity;
use std::collections::BTreeSet;

/// Maps a mutated source entity to the consumer's affected entities
pub trait AffectedEntityResolver: Send + Sync {
    /// Entities affected by a change to `source_entity`.
    ///
    /// Unknown sources and sources without dependents resolve to an empty set.
    fn resolve(&self, source_entity: &str) -> Result<BTreeSet<AffectedEntity>>;

    /// Reference system the entity's merged region is expressed in
    fn target_reference_system(&self, entity: &AffectedEntity) -> Result<ReferenceSystem>;
}

/// Combines an entity's pending extents into one
pub trait RegionMerger: Send + Sync {
    /// `None` when there is nothing to merge
    fn merge(
        &self,
        target: &ReferenceSystem,
        extents: &[SpatialExtent],
    ) -> Result<Option<SpatialExtent>>;
}

/// The consumer's side effect for one affected entity
pub trait ChangeHandler: Send + Sync {
    fn apply(&self, entity: &AffectedEntity, merged: &SpatialExtent) -> Result<()>;
}
