//! Converter taxonomy
//!
//! Every converter is invoked with the destination document, the concrete
//! source path and the source value, and either mutates the document or
//! fails. The seven behaviors are a closed set dispatched by `match`.
//!
//! Copyright (c) 2025 Sloconv Team
//! Licensed under the Apache-2.0 license

use crate::annotations::ExtensionField;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::setter;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A pure value-mapping function used by [`Converter::Transform`]
pub type TransformFn = Arc<dyn Fn(&Path, &Value) -> Result<Value> + Send + Sync>;

/// A free-form document rewrite used by [`Converter::Custom`]
pub type CustomFn = Arc<dyn Fn(&mut Value, &Path, &Value) -> Result<()> + Send + Sync>;

/// Placeholder for one captured index in an [`IndexTemplate`]
pub const INDEX_PLACEHOLDER: &str = "{}";

/// How one source binding lands in the destination document
#[derive(Clone)]
pub enum Converter {
    /// Drop the value; it does not fall through to the extension fallback
    Discard,
    /// Write the value at the same path as the source
    Identity,
    /// Write the value at a fixed destination path
    Rename(Path),
    /// Write the value at a path built from the source path's indices
    IndexedRename(IndexTemplate),
    /// Map the value, then write it at the same path as the source
    Transform(TransformFn),
    /// Store the value in the destination's extension-field map
    Extension(ExtensionField),
    /// Arbitrary rewrite of the destination document
    Custom(CustomFn),
}

/// Discriminant of a [`Converter`], used for logging and rule listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConverterKind {
    Discard,
    Identity,
    Rename,
    IndexedRename,
    Transform,
    Extension,
    Custom,
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConverterKind::Discard => "discard",
            ConverterKind::Identity => "identity",
            ConverterKind::Rename => "rename",
            ConverterKind::IndexedRename => "indexed-rename",
            ConverterKind::Transform => "transform",
            ConverterKind::Extension => "extension",
            ConverterKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl Converter {
    pub fn rename(target: &str) -> Self {
        Converter::Rename(Path::parse(target))
    }

    /// Rename into a template such as `spec.conditions.{}.op`
    pub fn indexed(template: &str) -> Self {
        Converter::IndexedRename(IndexTemplate::new(template))
    }

    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Path, &Value) -> Result<Value> + Send + Sync + 'static,
    {
        Converter::Transform(Arc::new(f))
    }

    /// Transform that replaces any source value with `value`
    pub fn constant(value: Value) -> Self {
        Converter::transform(move |_, _| Ok(value.clone()))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut Value, &Path, &Value) -> Result<()> + Send + Sync + 'static,
    {
        Converter::Custom(Arc::new(f))
    }

    pub fn kind(&self) -> ConverterKind {
        match self {
            Converter::Discard => ConverterKind::Discard,
            Converter::Identity => ConverterKind::Identity,
            Converter::Rename(_) => ConverterKind::Rename,
            Converter::IndexedRename(_) => ConverterKind::IndexedRename,
            Converter::Transform(_) => ConverterKind::Transform,
            Converter::Extension(_) => ConverterKind::Extension,
            Converter::Custom(_) => ConverterKind::Custom,
        }
    }

    /// Destination description for listings, where the converter has a static one
    pub fn target(&self) -> Option<String> {
        match self {
            Converter::Rename(path) => Some(path.to_string()),
            Converter::IndexedRename(template) => Some(template.to_string()),
            Converter::Extension(field) => Some(format!("{}[{}*]", field.map(), field.namespace())),
            _ => None,
        }
    }

    /// Apply the converter to one source binding
    pub fn apply(&self, doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
        match self {
            Converter::Discard => Ok(()),
            Converter::Identity => setter::set(doc, path, value),
            Converter::Rename(target) => setter::set(doc, target, value),
            Converter::IndexedRename(template) => setter::set(doc, &template.resolve(path)?, value),
            Converter::Transform(f) => {
                let converted = f(path, value)?;
                setter::set(doc, path, &converted)
            }
            Converter::Extension(field) => field.write(doc, path, value),
            Converter::Custom(f) => f(doc, path, value),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(target) => write!(f, "{}({})", self.kind(), target),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// Destination path template with positional index placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTemplate {
    template: String,
}

impl IndexTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Number of indices the template consumes
    pub fn placeholders(&self) -> usize {
        self.template.matches(INDEX_PLACEHOLDER).count()
    }

    /// Substitute the source path's indices, left to right, into the template
    ///
    /// Indices beyond what the template consumes are ignored.
    pub fn resolve(&self, source: &Path) -> Result<Path> {
        let indices = source.indices();
        if indices.len() < self.placeholders() {
            return Err(Error::MissingIndex {
                path: source.to_string(),
                template: self.template.clone(),
            });
        }
        let mut resolved = String::with_capacity(self.template.len());
        let mut pieces = self.template.split(INDEX_PLACEHOLDER);
        if let Some(first) = pieces.next() {
            resolved.push_str(first);
        }
        for (piece, index) in pieces.zip(indices) {
            resolved.push_str(&index.to_string());
            resolved.push_str(piece);
        }
        Ok(Path::parse(&resolved))
    }
}

impl fmt::Display for IndexTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
