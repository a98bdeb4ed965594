use thiserror::Error;

/// Failures raised inside the dirty-region pipeline.
///
/// None of these ever reach the host transaction engine: the observer
/// contains them per mutation (resolution) or per affected entity
/// (geometry and dispatch) and logs them as warnings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirtyRegionError {
    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Reference system mismatch: expected {expected}, found {found}")]
    ReferenceSystemMismatch { expected: String, found: String },

    #[error("No transform registered from {from} to {to}")]
    UnknownTransform { from: String, to: String },

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DirtyRegionError {
    /// Short label of the error family, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            DirtyRegionError::Resolution(_) => "resolution",
            DirtyRegionError::Geometry(_)
            | DirtyRegionError::InvalidExtent(_)
            | DirtyRegionError::ReferenceSystemMismatch { .. }
            | DirtyRegionError::UnknownTransform { .. }
            | DirtyRegionError::Transform(_) => "geometry",
            DirtyRegionError::Dispatch(_) => "dispatch",
            DirtyRegionError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, DirtyRegionError>;

impl From<serde_json::Error> for DirtyRegionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
