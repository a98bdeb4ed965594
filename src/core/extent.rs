// ============================================================================
// Spatial Extents
// ============================================================================
//
// Axis-aligned rectangular extent tagged with its reference system. The
// horizontal part is a `geo_types::Rect`; compound (3D) systems add a
// vertical range.
//
// Invariant: every coordinate is finite and min <= max on every axis.
//
// ============================================================================

use super::error::{DirtyRegionError, Result};
use super::reference::ReferenceSystem;
use geo_types::{Rect, coord};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialExtent {
    rect: Rect<f64>,
    vertical: Option<(f64, f64)>,
    reference: ReferenceSystem,
}

impl SpatialExtent {
    /// Create a 2D extent
    ///
    /// # Errors
    /// Returns `InvalidExtent` if a coordinate is not finite, if a minimum
    /// exceeds its maximum, or if `reference` is a compound (3D) system.
    pub fn new(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        reference: ReferenceSystem,
    ) -> Result<Self> {
        if reference.is_compound() {
            return Err(DirtyRegionError::InvalidExtent(format!(
                "2D extent cannot use compound reference system {}",
                reference
            )));
        }
        check_axis("x", min_x, max_x)?;
        check_axis("y", min_y, max_y)?;
        Ok(Self {
            rect: Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }),
            vertical: None,
            reference,
        })
    }

    /// Create a 3D extent in a compound reference system
    pub fn new_3d(
        min: (f64, f64, f64),
        max: (f64, f64, f64),
        reference: ReferenceSystem,
    ) -> Result<Self> {
        if !reference.is_compound() {
            return Err(DirtyRegionError::InvalidExtent(format!(
                "3D extent requires a compound reference system, got {}",
                reference
            )));
        }
        check_axis("x", min.0, max.0)?;
        check_axis("y", min.1, max.1)?;
        check_axis("z", min.2, max.2)?;
        Ok(Self {
            rect: Rect::new(coord! { x: min.0, y: min.1 }, coord! { x: max.0, y: max.1 }),
            vertical: Some((min.2, max.2)),
            reference,
        })
    }

    /// Wrap an existing rectangle. `Rect` already normalizes min/max.
    pub fn from_rect(rect: Rect<f64>, reference: ReferenceSystem) -> Result<Self> {
        Self::new(
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y,
            reference,
        )
    }

    pub fn min_x(&self) -> f64 {
        self.rect.min().x
    }

    pub fn min_y(&self) -> f64 {
        self.rect.min().y
    }

    pub fn max_x(&self) -> f64 {
        self.rect.max().x
    }

    pub fn max_y(&self) -> f64 {
        self.rect.max().y
    }

    /// Vertical range `(min_z, max_z)` of a 3D extent
    pub fn vertical(&self) -> Option<(f64, f64)> {
        self.vertical
    }

    pub fn rect(&self) -> &Rect<f64> {
        &self.rect
    }

    pub fn reference_system(&self) -> &ReferenceSystem {
        &self.reference
    }

    pub fn dimension(&self) -> usize {
        if self.vertical.is_some() { 3 } else { 2 }
    }

    pub fn is_3d(&self) -> bool {
        self.vertical.is_some()
    }

    /// Drop the vertical axis and adopt the horizontal component of the
    /// reference system. A 2D extent is returned unchanged.
    pub fn to_horizontal(&self) -> SpatialExtent {
        SpatialExtent {
            rect: self.rect,
            vertical: None,
            reference: self.reference.horizontal_component(),
        }
    }

    /// Grow this extent so it covers `other` as well.
    ///
    /// # Errors
    /// Both extents must share the same reference system; reproject first.
    pub fn expand_to_include(&mut self, other: &SpatialExtent) -> Result<()> {
        if self.reference != other.reference {
            return Err(DirtyRegionError::ReferenceSystemMismatch {
                expected: self.reference.to_string(),
                found: other.reference.to_string(),
            });
        }

        self.rect = Rect::new(
            coord! {
                x: self.min_x().min(other.min_x()),
                y: self.min_y().min(other.min_y()),
            },
            coord! {
                x: self.max_x().max(other.max_x()),
                y: self.max_y().max(other.max_y()),
            },
        );
        self.vertical = match (self.vertical, other.vertical) {
            (Some((a_min, a_max)), Some((b_min, b_max))) => Some((a_min.min(b_min), a_max.max(b_max))),
            (a, b) => a.or(b),
        };
        Ok(())
    }

    /// Non-mutating form of [`expand_to_include`](Self::expand_to_include)
    pub fn union(&self, other: &SpatialExtent) -> Result<SpatialExtent> {
        let mut merged = self.clone();
        merged.expand_to_include(other)?;
        Ok(merged)
    }

    pub fn contains(&self, other: &SpatialExtent) -> bool {
        self.reference == other.reference
            && self.min_x() <= other.min_x()
            && self.min_y() <= other.min_y()
            && self.max_x() >= other.max_x()
            && self.max_y() >= other.max_y()
    }

    /// Compare coordinates within an absolute tolerance
    pub fn approx_eq(&self, other: &SpatialExtent, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        let vertical_close = match (self.vertical, other.vertical) {
            (Some(a), Some(b)) => close(a.0, b.0) && close(a.1, b.1),
            (None, None) => true,
            _ => false,
        };
        self.reference == other.reference
            && close(self.min_x(), other.min_x())
            && close(self.min_y(), other.min_y())
            && close(self.max_x(), other.max_x())
            && close(self.max_y(), other.max_y())
            && vertical_close
    }
}

impl fmt::Display for SpatialExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vertical {
            Some((min_z, max_z)) => write!(
                f,
                "({},{},{})-({},{},{}) {}",
                self.min_x(),
                self.min_y(),
                min_z,
                self.max_x(),
                self.max_y(),
                max_z,
                self.reference
            ),
            None => write!(
                f,
                "({},{})-({},{}) {}",
                self.min_x(),
                self.min_y(),
                self.max_x(),
                self.max_y(),
                self.reference
            ),
        }
    }
}

fn check_axis(axis: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(DirtyRegionError::InvalidExtent(format!(
            "non-finite {} range [{}, {}]",
            axis, min, max
        )));
    }
    if min > max {
        return Err(DirtyRegionError::InvalidExtent(format!(
            "{} minimum {} exceeds maximum {}",
            axis, min, max
        )));
    }
    Ok(())
}
