// Collect -> merge -> dispatch. The observer holds no per-transaction
// fields; everything pending lives in the transaction's context.

use super::{AffectedEntityResolver, ChangeHandler, ObserverConfig, RegionMerger};
use crate::core::{DirtyRegionError, Result, SpatialExtent};
use crate::transaction::{AffectedEntity, DirtyRegionStore, MutationNotification, TransactionContext};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{Level, debug_span, event, info_span};

/// Outcome of one commit-time dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Entities whose handler ran successfully
    pub dispatched: usize,

    /// Entities whose merge produced no extent
    pub skipped: usize,

    /// Entities whose merge or handler failed
    pub failed: Vec<AffectedEntity>,
}

impl DispatchReport {
    pub fn total(&self) -> usize {
        self.dispatched + self.skipped + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Transaction observer for one consumer.
///
/// # Thread Safety
/// Stateless between calls and `Send + Sync`; a single instance can serve
/// concurrent transactions, each with its own `TransactionContext`.
pub struct MutationObserver {
    config: ObserverConfig,
    resolver: Arc<dyn AffectedEntityResolver>,
    merger: Arc<dyn RegionMerger>,
    handler: Arc<dyn ChangeHandler>,
}

impl MutationObserver {
    /// # Errors
    /// Returns error if `config` does not validate
    pub fn new(
        config: ObserverConfig,
        resolver: Arc<dyn AffectedEntityResolver>,
        merger: Arc<dyn RegionMerger>,
        handler: Arc<dyn ChangeHandler>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            resolver,
            merger,
            handler,
        })
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Record the notification's extent for every affected entity.
    ///
    /// Never fails: errors are logged and the mutation simply contributes
    /// nothing.
    pub fn on_before_operation(
        &self,
        ctx: &mut TransactionContext,
        notification: &MutationNotification<'_>,
    ) {
        let span = debug_span!(
            "dirty_region_collect",
            namespace = %self.config.namespace,
            txn = %ctx.id(),
            source = notification.source_entity,
            phase = %notification.phase,
        );
        let _guard = span.enter();

        match contain(DirtyRegionError::Resolution, || self.collect(ctx, notification)) {
            Ok(0) => {}
            Ok(appended) => event!(Level::DEBUG, appended = appended, "dirty region recorded"),
            Err(err) => event!(
                Level::WARN,
                error = %err,
                kind = err.kind(),
                "error pre computing the transaction's affected area"
            ),
        }
    }

    /// Merge and dispatch this namespace's pending regions on commit.
    ///
    /// A rolled back transaction returns without reading the store. On
    /// commit every entity is handled on its own; a failure is logged and
    /// the remaining entities still run.
    pub fn on_transaction_end(
        &self,
        ctx: &mut TransactionContext,
        committed: bool,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        if !committed {
            return report;
        }

        let span = info_span!(
            "dirty_region_dispatch",
            namespace = %self.config.namespace,
            txn = %ctx.id(),
        );
        let _guard = span.enter();

        let pending = match DirtyRegionStore::of_mut(ctx)
            .and_then(|store| store.for_namespace_mut(&self.config.namespace))
        {
            Some(regions) => regions.take_for_dispatch(),
            None => return report,
        };

        for (entity, extents) in pending {
            match contain(DirtyRegionError::Dispatch, || self.dispatch(&entity, &extents)) {
                Ok(true) => report.dispatched += 1,
                Ok(false) => report.skipped += 1,
                Err(err) => {
                    event!(
                        Level::WARN,
                        entity = %entity,
                        error = %err,
                        kind = err.kind(),
                        "dirty region dispatch failed, entity skipped for this commit"
                    );
                    report.failed.push(entity);
                }
            }
        }

        event!(
            Level::DEBUG,
            dispatched = report.dispatched,
            skipped = report.skipped,
            failed = report.failed.len(),
            "dirty region dispatch finished"
        );
        report
    }

    /// Returns the number of entities the extent was recorded for
    fn collect(
        &self,
        ctx: &mut TransactionContext,
        notification: &MutationNotification<'_>,
    ) -> Result<usize> {
        if !self.config.handles(notification.operation) {
            return Ok(0);
        }
        if notification.phase.duplicates_earlier_phase() {
            return Ok(0);
        }

        let affected = self.resolver.resolve(notification.source_entity)?;
        if affected.is_empty() {
            return Ok(0);
        }

        let Some(extent) = notification.records.extent()? else {
            return Ok(0);
        };

        let regions = DirtyRegionStore::attach(ctx)?.namespace_entry(&self.config.namespace);
        let count = affected.len();
        for entity in affected {
            regions.append(entity, extent.clone())?;
        }
        Ok(count)
    }

    /// Returns whether the handler ran
    fn dispatch(&self, entity: &AffectedEntity, extents: &[SpatialExtent]) -> Result<bool> {
        let target = self.resolver.target_reference_system(entity)?;
        let Some(merged) = self.merger.merge(&target, extents)? else {
            return Ok(false);
        };
        self.handler.apply(entity, &merged)?;
        Ok(true)
    }
}

impl std::fmt::Debug for MutationObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationObserver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Run one pipeline stage, turning a panic in a plugged-in capability
/// into an error of the stage's kind.
fn contain<T>(
    stage_error: fn(String) -> DirtyRegionError,
    stage: impl FnOnce() -> Result<T>,
) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(stage))
        .unwrap_or_else(|payload| Err(stage_error(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}
