// ============================================================================
// Reprojection
// ============================================================================
//
// Point transforms between reference systems, looked up by authority code
// in a `TransformRegistry`. Envelopes are reprojected by transforming a
// densified boundary and taking the bounds of the result, so curved
// transforms do not clip the extent.
//
// Only spherical Web Mercator ships built in. Hosts plug real projection
// support in through `TransformRegistry::register`.
//
// ============================================================================

pub mod mercator;
pub mod registry;

pub use mercator::{GeographicToWebMercator, WebMercatorToGeographic};
pub use registry::TransformRegistry;

use crate::core::Result;
use geo_types::{Coord, coord};

/// Default number of boundary samples when reprojecting an envelope
pub const DEFAULT_DENSIFY_POINTS: usize = 1000;

/// Upper bound on boundary samples; larger budgets are clamped to it
pub const MAX_DENSIFY_POINTS: usize = 10_000;

/// A point-wise coordinate operation from one system to another
pub trait CoordinateTransform: Send + Sync {
    /// Name for diagnostics
    fn name(&self) -> &str;

    fn transform(&self, point: Coord<f64>) -> Result<Coord<f64>>;
}

/// Two codes naming the same system
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl CoordinateTransform for IdentityTransform {
    fn name(&self) -> &str {
        "identity"
    }

    fn transform(&self, point: Coord<f64>) -> Result<Coord<f64>> {
        Ok(point)
    }
}

/// `x' = scale_x * x + offset_x`, `y' = scale_y * y + offset_y`
#[derive(Debug, Clone, Copy)]
pub struct AffineTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl AffineTransform {
    pub fn new(scale_x: f64, scale_y: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        }
    }

    pub fn translation(offset_x: f64, offset_y: f64) -> Self {
        Self::new(1.0, 1.0, offset_x, offset_y)
    }

    /// The reverse operation, if the scales are non-zero
    pub fn inverse(&self) -> Option<Self> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return None;
        }
        Some(Self::new(
            1.0 / self.scale_x,
            1.0 / self.scale_y,
            -self.offset_x / self.scale_x,
            -self.offset_y / self.scale_y,
        ))
    }
}

impl CoordinateTransform for AffineTransform {
    fn name(&self) -> &str {
        "affine"
    }

    fn transform(&self, point: Coord<f64>) -> Result<Coord<f64>> {
        Ok(coord! {
            x: self.scale_x * point.x + self.offset_x,
            y: self.scale_y * point.y + self.offset_y,
        })
    }
}

/// Sample points along the boundary of `[min, max]`, corners included.
///
/// At most `budget` points are produced (never fewer than the four corners,
/// never more than [`MAX_DENSIFY_POINTS`]).
pub(crate) fn boundary_samples(min: Coord<f64>, max: Coord<f64>, budget: usize) -> Vec<Coord<f64>> {
    let per_edge = (budget.min(MAX_DENSIFY_POINTS) / 4).max(1);
    let corners = [
        min,
        coord! { x: max.x, y: min.y },
        max,
        coord! { x: min.x, y: max.y },
    ];

    let mut samples = Vec::with_capacity(per_edge * 4);
    for i in 0..4 {
        let from = corners[i];
        let to = corners[(i + 1) % 4];
        for step in 0..per_edge {
            let t = step as f64 / per_edge as f64;
            samples.push(coord! {
                x: from.x + (to.x - from.x) * t,
                y: from.y + (to.y - from.y) * t,
            });
        }
    }
    samples
}
