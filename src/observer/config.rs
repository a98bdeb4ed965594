use crate::core::{DirtyRegionError, Result};
use crate::transaction::OperationKind;
use crate::transform::{DEFAULT_DENSIFY_POINTS, MAX_DENSIFY_POINTS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-consumer observer configuration
///
/// Similar to a connection config: `new` fills in defaults, the consuming
/// setters override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Namespace tag the consumer's dirty regions are stored under
    pub namespace: String,

    /// Operation kinds whose notifications are collected
    #[serde(default = "default_operations")]
    pub operations: BTreeSet<OperationKind>,

    /// Boundary samples used when reprojecting an extent, 4 to
    /// [`MAX_DENSIFY_POINTS`]
    #[serde(default = "default_densify_points")]
    pub densify_points: usize,

    /// Listener ordering, higher runs first
    #[serde(default)]
    pub priority: i32,
}

fn default_operations() -> BTreeSet<OperationKind> {
    [
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Delete,
    ]
    .into_iter()
    .collect()
}

fn default_densify_points() -> usize {
    DEFAULT_DENSIFY_POINTS
}

impl ObserverConfig {
    /// Create a configuration collecting inserts, updates and deletes
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            operations: default_operations(),
            densify_points: DEFAULT_DENSIFY_POINTS,
            priority: 0,
        }
    }

    /// Set the collected operation kinds
    pub fn operations(mut self, operations: impl IntoIterator<Item = OperationKind>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    /// Set the reprojection sample budget
    pub fn densify_points(mut self, points: usize) -> Self {
        self.densify_points = points;
        self
    }

    /// Set the listener priority
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether notifications of `operation` are collected
    pub fn handles(&self, operation: OperationKind) -> bool {
        operation.changes_extent() && self.operations.contains(&operation)
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(DirtyRegionError::Config("namespace must not be empty".into()));
        }
        if self.densify_points < 4 {
            return Err(DirtyRegionError::Config(format!(
                "densify_points must be at least 4, got {}",
                self.densify_points
            )));
        }
        if self.densify_points > MAX_DENSIFY_POINTS {
            return Err(DirtyRegionError::Config(format!(
                "densify_points must be at most {}, got {}",
                MAX_DENSIFY_POINTS, self.densify_points
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use dirtyregion::ObserverConfig;
    ///
    /// let config = ObserverConfig::from_json(r#"{"namespace": "tile-cache"}"#).unwrap();
    /// assert_eq!(config.densify_points, 1000);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ObserverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
