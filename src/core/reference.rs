// ============================================================================
// Reference Systems
// ============================================================================
//
// Identifies the coordinate system an extent is expressed in. Only the
// identity of a system matters here; the actual math lives behind
// `transform::CoordinateTransform`.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

pub const WGS84: &str = "EPSG:4326";
pub const WEB_MERCATOR: &str = "EPSG:3857";

/// Coordinate reference system of a spatial extent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceSystem {
    /// Purely horizontal (2D) system, geographic or projected
    Horizontal { code: String },

    /// Horizontal system combined with a vertical datum (3D)
    Compound {
        code: String,
        horizontal: String,
        vertical: String,
    },
}

impl ReferenceSystem {
    pub fn horizontal(code: impl Into<String>) -> Self {
        ReferenceSystem::Horizontal { code: code.into() }
    }

    pub fn compound(
        code: impl Into<String>,
        horizontal: impl Into<String>,
        vertical: impl Into<String>,
    ) -> Self {
        ReferenceSystem::Compound {
            code: code.into(),
            horizontal: horizontal.into(),
            vertical: vertical.into(),
        }
    }

    pub fn wgs84() -> Self {
        Self::horizontal(WGS84)
    }

    pub fn web_mercator() -> Self {
        Self::horizontal(WEB_MERCATOR)
    }

    /// Authority code of this system, e.g. `EPSG:7415`
    pub fn code(&self) -> &str {
        match self {
            ReferenceSystem::Horizontal { code } => code,
            ReferenceSystem::Compound { code, .. } => code,
        }
    }

    /// Number of axes an extent in this system carries
    pub fn dimension(&self) -> usize {
        match self {
            ReferenceSystem::Horizontal { .. } => 2,
            ReferenceSystem::Compound { .. } => 3,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, ReferenceSystem::Compound { .. })
    }

    /// The horizontal component. A horizontal system is its own component.
    pub fn horizontal_component(&self) -> ReferenceSystem {
        match self {
            ReferenceSystem::Horizontal { .. } => self.clone(),
            ReferenceSystem::Compound { horizontal, .. } => Self::horizontal(horizontal.clone()),
        }
    }
}

impl fmt::Display for ReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSystem::Horizontal { code } => write!(f, "{}", code),
            ReferenceSystem::Compound {
                code,
                horizontal,
                vertical,
            } => write!(f, "{} ({} + {})", code, horizontal, vertical),
        }
    }
}
