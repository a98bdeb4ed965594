//! Shared in-memory collaborators for integration tests
#![allow(dead_code)]

use dirtyregion::consumers::{
    CacheError, CacheResult, CacheTruncator, CatalogResult, ExtentCatalog, SegmentRegistry,
};
use dirtyregion::{
    AffectedEntity, AffectedEntityResolver, ChangeHandler, DirtyRegionError, ReferenceSystem,
    Result, SpatialExtent,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

pub fn wgs(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> SpatialExtent {
    SpatialExtent::new(min_x, min_y, max_x, max_y, ReferenceSystem::wgs84()).unwrap()
}

pub fn mercator(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> SpatialExtent {
    SpatialExtent::new(min_x, min_y, max_x, max_y, ReferenceSystem::web_mercator()).unwrap()
}

/// Tile layers keyed by the source entity they are built from
#[derive(Default)]
pub struct InMemorySegments {
    by_source: Mutex<HashMap<String, BTreeSet<String>>>,
    declared: Mutex<HashMap<String, ReferenceSystem>>,
}

impl InMemorySegments {
    pub fn add(&self, source: &str, segment: &str, reference: ReferenceSystem) {
        self.by_source
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .insert(segment.to_string());
        self.declared
            .lock()
            .unwrap()
            .insert(segment.to_string(), reference);
    }

    pub fn remove_segment(&self, segment: &str) {
        self.declared.lock().unwrap().remove(segment);
    }
}

impl SegmentRegistry for InMemorySegments {
    fn segments_depending_on(&self, entity_name: &str) -> CacheResult<BTreeSet<String>> {
        Ok(self
            .by_source
            .lock()
            .unwrap()
            .get(entity_name)
            .cloned()
            .unwrap_or_default())
    }

    fn declared_reference_system(&self, segment: &str) -> CacheResult<ReferenceSystem> {
        self.declared
            .lock()
            .unwrap()
            .get(segment)
            .cloned()
            .ok_or_else(|| CacheError::SegmentNotFound(segment.to_string()))
    }
}

/// Records every truncation; segments in `missing` report not found,
/// segments in `failing` report a truncation error
#[derive(Default)]
pub struct RecordingTruncator {
    pub calls: Mutex<Vec<(String, SpatialExtent)>>,
    pub missing: Mutex<BTreeSet<String>>,
    pub failing: Mutex<BTreeSet<String>>,
}

impl RecordingTruncator {
    pub fn calls(&self) -> Vec<(String, SpatialExtent)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, segment: &str) -> Vec<SpatialExtent> {
        self.calls()
            .into_iter()
            .filter(|(s, _)| s == segment)
            .map(|(_, e)| e)
            .collect()
    }
}

impl CacheTruncator for RecordingTruncator {
    fn truncate(&self, segment: &str, extent: &SpatialExtent) -> CacheResult<()> {
        if self.missing.lock().unwrap().contains(segment) {
            return Err(CacheError::SegmentNotFound(segment.to_string()));
        }
        if self.failing.lock().unwrap().contains(segment) {
            return Err(CacheError::Truncation(format!("{} is locked", segment)));
        }
        self.calls
            .lock()
            .unwrap()
            .push((segment.to_string(), extent.clone()));
        Ok(())
    }
}

/// Native extents by entity id, counting saves
#[derive(Default)]
pub struct InMemoryCatalog {
    extents: Mutex<HashMap<String, SpatialExtent>>,
    pub saves: Mutex<Vec<String>>,
}

impl InMemoryCatalog {
    pub fn with(entries: &[(&str, SpatialExtent)]) -> Self {
        let catalog = Self::default();
        for (id, extent) in entries {
            catalog
                .extents
                .lock()
                .unwrap()
                .insert(id.to_string(), extent.clone());
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<SpatialExtent> {
        self.extents.lock().unwrap().get(id).cloned()
    }

    pub fn remove(&self, id: &str) {
        self.extents.lock().unwrap().remove(id);
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }
}

impl ExtentCatalog for InMemoryCatalog {
    fn load(&self, entity_id: &str) -> CatalogResult<Option<SpatialExtent>> {
        Ok(self.get(entity_id))
    }

    fn save(&self, entity_id: &str, extent: SpatialExtent) -> CatalogResult<()> {
        self.saves.lock().unwrap().push(entity_id.to_string());
        self.extents
            .lock()
            .unwrap()
            .insert(entity_id.to_string(), extent);
        Ok(())
    }
}

/// Resolver with a fixed source -> entities table. Sources listed in
/// `failing` raise a resolution error.
#[derive(Default)]
pub struct TableResolver {
    pub table: HashMap<String, BTreeSet<AffectedEntity>>,
    pub failing: BTreeSet<String>,
    pub target: Option<ReferenceSystem>,
}

impl TableResolver {
    pub fn map(mut self, source: &str, entities: &[&str]) -> Self {
        self.table.insert(
            source.to_string(),
            entities.iter().map(|e| AffectedEntity::from(*e)).collect(),
        );
        self
    }

    pub fn fail_on(mut self, source: &str) -> Self {
        self.failing.insert(source.to_string());
        self
    }

    pub fn target(mut self, reference: ReferenceSystem) -> Self {
        self.target = Some(reference);
        self
    }
}

impl AffectedEntityResolver for TableResolver {
    fn resolve(&self, source_entity: &str) -> Result<BTreeSet<AffectedEntity>> {
        if self.failing.contains(source_entity) {
            return Err(DirtyRegionError::Resolution(format!(
                "registry unavailable for {}",
                source_entity
            )));
        }
        Ok(self.table.get(source_entity).cloned().unwrap_or_default())
    }

    fn target_reference_system(&self, _entity: &AffectedEntity) -> Result<ReferenceSystem> {
        Ok(self.target.clone().unwrap_or_else(ReferenceSystem::wgs84))
    }
}

/// Handler recording each invocation
#[derive(Default)]
pub struct RecordingHandler {
    pub calls: Mutex<Vec<(AffectedEntity, SpatialExtent)>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<(AffectedEntity, SpatialExtent)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChangeHandler for RecordingHandler {
    fn apply(&self, entity: &AffectedEntity, merged: &SpatialExtent) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((entity.clone(), merged.clone()));
        Ok(())
    }
}
