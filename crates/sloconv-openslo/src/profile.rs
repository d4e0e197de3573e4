//! OpenSLO v1 to Nobl9 v1alpha conversion profile

use crate::checks;
use crate::options::ConversionOptions;
use crate::rules;
use crate::version::{ApiVersion, Kind};
use serde_json::{json, Value};
use sloconv_core::{setter, ConversionProfile, ExtensionBridge, Path, PathOrdering, Result, Rules};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Rule tables and conventions for converting OpenSLO into Nobl9
///
/// Tables are built once per profile and shared by every object it converts.
#[derive(Debug, Clone)]
pub struct OpenSloProfile {
    options: ConversionOptions,
    tables: HashMap<Kind, Arc<Rules>>,
    ordering: PathOrdering,
    bridge: Arc<ExtensionBridge>,
}

impl OpenSloProfile {
    pub fn new(options: ConversionOptions) -> Self {
        let bridge = Arc::new(rules::extension_bridge());
        let tables = Kind::ALL
            .into_iter()
            .filter_map(|kind| rules::v1(kind, &bridge).map(|table| (kind, Arc::new(table))))
            .collect();
        Self {
            options,
            tables,
            ordering: rules::path_ordering(),
            bridge,
        }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Table for a parsed version and kind
    pub fn table(&self, version: ApiVersion, kind: Kind) -> Option<Arc<Rules>> {
        match version {
            ApiVersion::V1 => self.tables.get(&kind).cloned(),
        }
    }

    fn parse(&self, version: &str, kind: &str) -> Result<(ApiVersion, Kind)> {
        let version: ApiVersion = version.parse()?;
        Ok((version, Kind::parse(version, kind)?))
    }
}

impl Default for OpenSloProfile {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

impl ConversionProfile for OpenSloProfile {
    fn rules(&self, version: &str, kind: &str) -> Result<Option<Arc<Rules>>> {
        let (version, kind) = self.parse(version, kind)?;
        Ok(self.table(version, kind))
    }

    fn ordering(&self) -> &PathOrdering {
        &self.ordering
    }

    fn extensions(&self) -> &ExtensionBridge {
        &self.bridge
    }

    fn check(&self, object: &Value, version: &str, kind: &str) -> Result<()> {
        let (_, kind) = self.parse(version, kind)?;
        checks::check(object, kind)
    }

    fn finalize(&self, doc: &mut Value, source: &Value) -> Result<()> {
        let project = Path::parse("metadata.project");
        let has_project = setter::get(doc, &project)
            .and_then(Value::as_str)
            .is_some_and(|p| !p.is_empty());
        if !has_project {
            debug!(project = %self.options.default_project, "Assigning default project");
            setter::set_indexed(doc, &project, json!(self.options.default_project))?;
        }
        if self.options.record_source_version {
            if let Some(version) = source.get("apiVersion") {
                self.bridge
                    .fallback()
                    .write(doc, &Path::parse("apiVersion"), version)?;
            }
        }
        Ok(())
    }
}
