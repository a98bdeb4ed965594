// ============================================================================
// Mutation Notifications
// ============================================================================
//
// What the host tells listeners about each mutating operation: which
// source entity was written, by what kind of request element, in which
// lifecycle phase, and a lazy handle to the records it touched.
//
// ============================================================================

use crate::core::{Result, SpatialExtent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of request element that produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Insert,
    Update,
    Delete,

    /// Any other element (native requests, locks, ...). Never changes extents.
    Other,
}

impl OperationKind {
    pub fn changes_extent(&self) -> bool {
        !matches!(self, OperationKind::Other)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Insert => write!(f, "INSERT"),
            OperationKind::Update => write!(f, "UPDATE"),
            OperationKind::Delete => write!(f, "DELETE"),
            OperationKind::Other => write!(f, "OTHER"),
        }
    }
}

/// Phase of an operation a notification is emitted in
///
/// ```text
/// insert: PreInsert ──> PostInsert
/// update: PreUpdate ──> PostUpdate
/// delete: PreDelete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Records about to be inserted
    PreInsert,

    /// Same records after insertion
    PostInsert,

    /// Records as they were before the update
    PreUpdate,

    /// Records as they are after the update
    PostUpdate,

    /// Records about to be removed
    PreDelete,
}

impl LifecyclePhase {
    /// True when the phase repeats an extent an earlier phase of the same
    /// operation already reported
    pub fn duplicates_earlier_phase(&self) -> bool {
        matches!(self, LifecyclePhase::PostInsert)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::PreInsert => write!(f, "PRE_INSERT"),
            LifecyclePhase::PostInsert => write!(f, "POST_INSERT"),
            LifecyclePhase::PreUpdate => write!(f, "PRE_UPDATE"),
            LifecyclePhase::PostUpdate => write!(f, "POST_UPDATE"),
            LifecyclePhase::PreDelete => write!(f, "PRE_DELETE"),
        }
    }
}

/// Lazily evaluated records touched by one operation.
///
/// `extent` is only called once a listener knows the notification matters
/// to it, so computing bounds can be deferred by the host.
pub trait AffectedRecords {
    /// Bounds of the records, `None` when there are none
    fn extent(&self) -> Result<Option<SpatialExtent>>;
}

impl AffectedRecords for SpatialExtent {
    fn extent(&self) -> Result<Option<SpatialExtent>> {
        Ok(Some(self.clone()))
    }
}

impl AffectedRecords for Option<SpatialExtent> {
    fn extent(&self) -> Result<Option<SpatialExtent>> {
        Ok(self.clone())
    }
}

/// Records whose bounds come from a closure
pub struct LazyRecords<F>(pub F);

impl<F> AffectedRecords for LazyRecords<F>
where
    F: Fn() -> Result<Option<SpatialExtent>>,
{
    fn extent(&self) -> Result<Option<SpatialExtent>> {
        (self.0)()
    }
}

/// One mutating operation as reported by the host
#[derive(Clone, Copy)]
pub struct MutationNotification<'a> {
    pub source_entity: &'a str,
    pub operation: OperationKind,
    pub phase: LifecyclePhase,
    pub records: &'a dyn AffectedRecords,
}

impl<'a> MutationNotification<'a> {
    pub fn new(
        source_entity: &'a str,
        operation: OperationKind,
        phase: LifecyclePhase,
        records: &'a dyn AffectedRecords,
    ) -> Self {
        Self {
            source_entity,
            operation,
            phase,
            records,
        }
    }

    pub fn pre_insert(source_entity: &'a str, records: &'a dyn AffectedRecords) -> Self {
        Self::new(source_entity, OperationKind::Insert, LifecyclePhase::PreInsert, records)
    }

    pub fn post_insert(source_entity: &'a str, records: &'a dyn AffectedRecords) -> Self {
        Self::new(source_entity, OperationKind::Insert, LifecyclePhase::PostInsert, records)
    }

    pub fn pre_update(source_entity: &'a str, records: &'a dyn AffectedRecords) -> Self {
        Self::new(source_entity, OperationKind::Update, LifecyclePhase::PreUpdate, records)
    }

    pub fn post_update(source_entity: &'a str, records: &'a dyn AffectedRecords) -> Self {
        Self::new(source_entity, OperationKind::Update, LifecyclePhase::PostUpdate, records)
    }

    pub fn pre_delete(source_entity: &'a str, records: &'a dyn AffectedRecords) -> Self {
        Self::new(source_entity, OperationKind::Delete, LifecyclePhase::PreDelete, records)
    }
}

impl fmt::Debug for MutationNotification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationNotification")
            .field("source_entity", &self.source_entity)
            .field("operation", &self.operation)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DirtyRegionError, ReferenceSystem};
    use std::cell::Cell;

    #[test]
    fn test_only_post_insert_duplicates() {
        assert!(LifecyclePhase::PostInsert.duplicates_earlier_phase());
        assert!(!LifecyclePhase::PreInsert.duplicates_earlier_phase());
        assert!(!LifecyclePhase::PreUpdate.duplicates_earlier_phase());
        assert!(!LifecyclePhase::PostUpdate.duplicates_earlier_phase());
        assert!(!LifecyclePhase::PreDelete.duplicates_earlier_phase());
    }

    #[test]
    fn test_other_operations_never_change_extent() {
        assert!(!OperationKind::Other.changes_extent());
        assert!(OperationKind::Delete.changes_extent());
    }

    #[test]
    fn test_lazy_records_evaluate_on_demand() {
        let calls = Cell::new(0);
        let records = LazyRecords(|| -> Result<Option<SpatialExtent>> {
            calls.set(calls.get() + 1);
            Err(DirtyRegionError::Geometry("no bounds".into()))
        });
        let notification = MutationNotification::pre_update("topp:roads", &records);
        assert_eq!(calls.get(), 0);
        assert!(notification.records.extent().is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_extent_is_its_own_record_set() {
        let extent = SpatialExtent::new(0.0, 0.0, 1.0, 1.0, ReferenceSystem::wgs84()).unwrap();
        assert_eq!(extent.extent().unwrap(), Some(extent.clone()));
        assert_eq!(None::<SpatialExtent>.extent().unwrap(), None);
    }
}
