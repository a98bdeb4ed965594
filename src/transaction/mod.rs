// ============================================================================
// Transaction-Scoped State
// ============================================================================
//
// Everything the engine keeps per transaction lives in the host's
// `TransactionContext`:
// - `DirtyRegionStore`: pending extents per namespace and affected entity
// - `MutationNotification`: what the host reports for each operation
//
// ============================================================================

pub mod context;
pub mod features;
pub mod notification;
pub mod store;

pub use context::{TransactionContext, TransactionId};
pub use features::FeatureSet;
pub use notification::{
    AffectedRecords, LazyRecords, LifecyclePhase, MutationNotification, OperationKind,
};
pub use store::{
    AffectedEntity, DIRTY_REGION_STORE_KEY, DirtyRegionStore, NamespaceRegions, NamespaceState,
};
