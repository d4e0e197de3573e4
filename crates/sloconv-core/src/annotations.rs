//! Extension-field bridge
//!
//! The destination keeps data it has no first-class field for in a
//! namespaced string map (for Nobl9 that is `metadata.annotations`). The
//! same map serves two purposes:
//!
//! * unmapped source leaves are stored there under a fallback namespace,
//!   keyed by their source path
//! * entries of the source object's own extension map whose key starts with
//!   the override prefix are read as absolute destination paths and written
//!   there directly
//!
//! Copyright (c) 2025 Sloconv Team
//! Licensed under the Apache-2.0 license

use crate::converter::Converter;
use crate::error::{Error, Result};
use crate::path::{Path, Segment};
use crate::setter;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

/// One namespace inside the destination's extension map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionField {
    map: Path,
    namespace: String,
}

impl ExtensionField {
    pub fn new(map: impl Into<Path>, namespace: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            namespace: namespace.into(),
        }
    }

    pub fn map(&self) -> &Path {
        &self.map
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Map key for a value found at `source`
    ///
    /// The key embeds the textual source path, so dots inside source keys
    /// stay escaped and the key can be parsed back into the same path.
    pub fn key_for(&self, source: &Path) -> String {
        format!("{}{}", self.namespace, source)
    }

    /// Destination path of the map entry for `source`
    pub fn path_for(&self, source: &Path) -> Path {
        self.map.child(Segment::Key(self.key_for(source)))
    }

    /// Store `value` under the key derived from `source`
    pub fn write(&self, doc: &mut Value, source: &Path, value: &Value) -> Result<()> {
        let encoded = encode(source, value)?;
        setter::set_indexed(doc, &self.path_for(source), encoded)
    }

    /// Read back the value stored for `source`, if any
    pub fn read<'a>(&self, doc: &'a Value, source: &Path) -> Option<&'a Value> {
        setter::get(doc, &self.path_for(source))
    }
}

/// Encode a value for the string-valued extension map
///
/// Composite values become JSON text; scalars are written unchanged.
pub fn encode(path: &Path, value: &Value) -> Result<Value> {
    match value {
        Value::Object(_) | Value::Array(_) => serde_json::to_string(value)
            .map(Value::String)
            .map_err(|e| Error::transform_with(path, "cannot encode extension value", e)),
        scalar => Ok(scalar.clone()),
    }
}

/// Configuration of the extension map for one destination schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionBridge {
    fallback: ExtensionField,
    override_prefix: String,
}

impl ExtensionBridge {
    /// * `map` - location of the extension map in the destination
    /// * `fallback_namespace` - key prefix for unmapped source fields
    /// * `override_prefix` - key prefix marking a destination path
    pub fn new(
        map: impl Into<Path>,
        fallback_namespace: impl Into<String>,
        override_prefix: impl Into<String>,
    ) -> Self {
        Self {
            fallback: ExtensionField::new(map, fallback_namespace),
            override_prefix: override_prefix.into(),
        }
    }

    pub fn map(&self) -> &Path {
        self.fallback.map()
    }

    /// Field used for source leaves no rule matches
    pub fn fallback(&self) -> &ExtensionField {
        &self.fallback
    }

    pub fn override_prefix(&self) -> &str {
        &self.override_prefix
    }

    /// Field in the same map under another namespace
    pub fn field(&self, namespace: impl Into<String>) -> ExtensionField {
        ExtensionField::new(self.map().clone(), namespace)
    }

    /// Converter storing values under `namespace`
    pub fn extension(&self, namespace: impl Into<String>) -> Converter {
        Converter::Extension(self.field(namespace))
    }

    /// Converter storing values under the fallback namespace
    pub fn fallback_converter(&self) -> Converter {
        Converter::Extension(self.fallback.clone())
    }

    /// Converter applying the source object's own extension map
    pub fn override_converter(self: &Arc<Self>) -> Converter {
        let bridge = Arc::clone(self);
        Converter::custom(move |doc, path, value| bridge.apply_overrides(doc, path, value))
    }

    /// Apply a source extension map
    ///
    /// Entries whose key starts with the override prefix are written at the
    /// destination path the rest of the key names. Every other entry is
    /// copied into the destination map under its own key.
    pub fn apply_overrides(&self, doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
        let entries = value
            .as_object()
            .ok_or_else(|| Error::type_mismatch(path, "object", value))?;
        for (key, entry) in entries {
            match key.strip_prefix(self.override_prefix.as_str()) {
                Some(target) if !target.is_empty() => {
                    trace!(key = %key, target = %target, "Applying extension override");
                    setter::set(doc, &Path::parse(target), entry)?;
                }
                _ => {
                    let destination = self.map().child(Segment::Key(key.clone()));
                    setter::set_indexed(doc, &destination, encode(path, entry)?)?;
                }
            }
        }
        Ok(())
    }
}
