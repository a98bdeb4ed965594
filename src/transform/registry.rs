use super::{
    CoordinateTransform, GeographicToWebMercator, IdentityTransform, WebMercatorToGeographic,
    boundary_samples,
};
use crate::core::{DirtyRegionError, ReferenceSystem, Result, SpatialExtent, WEB_MERCATOR, WGS84};
use std::collections::HashMap;
use std::sync::Arc;

/// Legacy code for spherical Web Mercator
const GOOGLE_MERCATOR: &str = "EPSG:900913";

/// Transforms keyed by `(source code, target code)`
pub struct TransformRegistry {
    transforms: HashMap<(String, String), Arc<dyn CoordinateTransform>>,
}

impl TransformRegistry {
    /// Registry without any transforms. Only same-system extents reproject.
    pub fn empty() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Registry with the built-in Web Mercator transforms
    pub fn with_default_transforms() -> Self {
        let mut registry = Self::empty();
        registry.register(WGS84, WEB_MERCATOR, Arc::new(GeographicToWebMercator));
        registry.register(WEB_MERCATOR, WGS84, Arc::new(WebMercatorToGeographic));
        registry.register(WGS84, GOOGLE_MERCATOR, Arc::new(GeographicToWebMercator));
        registry.register(GOOGLE_MERCATOR, WGS84, Arc::new(WebMercatorToGeographic));
        registry.register(WEB_MERCATOR, GOOGLE_MERCATOR, Arc::new(IdentityTransform));
        registry.register(GOOGLE_MERCATOR, WEB_MERCATOR, Arc::new(IdentityTransform));
        registry
    }

    /// Register the transform from `from` to `to`, replacing any previous one
    pub fn register(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        transform: Arc<dyn CoordinateTransform>,
    ) {
        self.transforms.insert((from.into(), to.into()), transform);
    }

    pub fn contains(&self, from: &str, to: &str) -> bool {
        self.transforms
            .contains_key(&(from.to_string(), to.to_string()))
    }

    pub fn find(&self, from: &str, to: &str) -> Result<Arc<dyn CoordinateTransform>> {
        self.transforms
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .ok_or_else(|| DirtyRegionError::UnknownTransform {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Reproject an extent into the horizontal component of `target`.
    ///
    /// 3D extents lose their vertical axis first. The boundary is sampled
    /// with at most `densify_points` points; any failing sample fails the
    /// whole reprojection.
    pub fn reproject(
        &self,
        extent: &SpatialExtent,
        target: &ReferenceSystem,
        densify_points: usize,
    ) -> Result<SpatialExtent> {
        let source = extent.to_horizontal();
        let target = target.horizontal_component();
        if source.reference_system() == &target {
            return Ok(source);
        }

        let transform = self.find(source.reference_system().code(), target.code())?;
        let samples = boundary_samples(source.rect().min(), source.rect().max(), densify_points);

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for sample in samples {
            let p = transform.transform(sample)?;
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(DirtyRegionError::Transform(format!(
                    "{} produced a non-finite coordinate for ({}, {})",
                    transform.name(),
                    sample.x,
                    sample.y
                )));
            }
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        SpatialExtent::new(min_x, min_y, max_x, max_y, target)
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_default_transforms()
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.transforms.keys().collect();
        keys.sort();
        f.debug_struct("TransformRegistry")
            .field("transforms", &keys)
            .finish()
    }
}
