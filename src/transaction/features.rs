//! Feature collections as affected records.
//!
//! Bounds are computed from the geometries with `geo::BoundingRect` only
//! when a listener asks for them.

use super::notification::AffectedRecords;
use crate::core::{ReferenceSystem, Result, SpatialExtent};
use geo::BoundingRect;
use geo_types::Geometry;

/// Geometries written by one operation, all in one reference system
#[derive(Debug, Clone)]
pub struct FeatureSet {
    reference: ReferenceSystem,
    geometries: Vec<Geometry<f64>>,
}

impl FeatureSet {
    pub fn new(reference: ReferenceSystem) -> Self {
        Self {
            reference,
            geometries: Vec::new(),
        }
    }

    pub fn with_geometries(reference: ReferenceSystem, geometries: Vec<Geometry<f64>>) -> Self {
        Self {
            reference,
            geometries,
        }
    }

    pub fn push(&mut self, geometry: impl Into<Geometry<f64>>) {
        self.geometries.push(geometry.into());
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn reference_system(&self) -> &ReferenceSystem {
        &self.reference
    }
}

impl AffectedRecords for FeatureSet {
    fn extent(&self) -> Result<Option<SpatialExtent>> {
        let mut bounds: Option<SpatialExtent> = None;
        // Empty geometries have no bounding rect and are skipped
        for rect in self.geometries.iter().filter_map(|g| g.bounding_rect()) {
            let extent = SpatialExtent::from_rect(rect, self.reference.clone())?;
            match bounds.as_mut() {
                Some(acc) => acc.expand_to_include(&extent)?,
                None => bounds = Some(extent),
            }
        }
        Ok(bounds)
    }
}
