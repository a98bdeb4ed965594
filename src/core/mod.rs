pub mod error;
pub mod extent;
pub mod reference;

pub use error::{DirtyRegionError, Result};
pub use extent::SpatialExtent;
pub use reference::{ReferenceSystem, WEB_MERCATOR, WGS84};
