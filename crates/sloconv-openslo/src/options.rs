//! Tunables of the OpenSLO to Nobl9 conversion

use serde::{Deserialize, Serialize};

/// Project assigned to objects that do not name one
pub const DEFAULT_PROJECT: &str = "default";

/// Options applied by the conversion post-step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Written to `metadata.project` when the converted object has none
    pub default_project: String,

    /// Record the source `apiVersion` as an `openslo.com/` annotation
    pub record_source_version: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            default_project: DEFAULT_PROJECT.to_string(),
            record_source_version: true,
        }
    }
}
