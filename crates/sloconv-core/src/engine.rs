//! Conversion driver
//!
//! An [`Engine`] converts decoded source objects with the rule tables and
//! destination conventions supplied by a [`ConversionProfile`]. Each object
//! gets a fresh destination document; the bindings of the object are
//! applied to it one at a time in [`PathOrdering`] order, and any error
//! discards the document.
//!
//! Copyright (c) 2025 Sloconv Team
//! Licensed under the Apache-2.0 license

use crate::annotations::ExtensionBridge;
use crate::error::{Error, Result};
use crate::ordering::PathOrdering;
use crate::path::Path;
use crate::registry::{MatchTier, Rules};
use crate::walker::Walker;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Destination-specific knowledge the engine needs
///
/// Implementations must be shareable across threads; rule tables are
/// handed out as `Arc` so one table can serve many objects.
pub trait ConversionProfile: Send + Sync {
    /// Rule table for a `(version, kind)` pair
    ///
    /// `Ok(None)` marks a kind that is intentionally not converted.
    fn rules(&self, version: &str, kind: &str) -> Result<Option<Arc<Rules>>>;

    /// Defer groups used to order bindings
    fn ordering(&self) -> &PathOrdering;

    /// Extension map configuration of the destination schema
    fn extensions(&self) -> &ExtensionBridge;

    /// Pre-step run on a source object whose kind has a rule table
    fn check(&self, _object: &Value, _version: &str, _kind: &str) -> Result<()> {
        Ok(())
    }

    /// Post-step run on every converted document
    fn finalize(&self, _doc: &mut Value, _source: &Value) -> Result<()> {
        Ok(())
    }

    /// Version and kind of a source object
    fn discriminators(&self, object: &Value) -> (String, String) {
        let field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        (field("apiVersion"), field("kind"))
    }

    /// Human-readable name of a source object, used in error context
    fn object_name(&self, object: &Value) -> Option<String> {
        object
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Counts of how bindings were dispatched during one conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub exact: usize,
    pub pattern: usize,
    pub fallback: usize,
}

impl DispatchStats {
    fn record(&mut self, tier: MatchTier) {
        match tier {
            MatchTier::Exact => self.exact += 1,
            MatchTier::Pattern => self.pattern += 1,
            MatchTier::Fallback => self.fallback += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.exact + self.pattern + self.fallback
    }
}

/// Converts source objects with a [`ConversionProfile`]
#[derive(Debug, Clone)]
pub struct Engine<P> {
    profile: P,
}

impl<P: ConversionProfile> Engine<P> {
    pub fn new(profile: P) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    /// Convert one object
    ///
    /// Returns `Ok(None)` when the profile skips the object's kind.
    pub fn convert_object(&self, object: &Value) -> Result<Option<Value>> {
        Ok(self.convert_object_with_stats(object)?.map(|(doc, _)| doc))
    }

    /// Convert one object and report how its bindings were dispatched
    pub fn convert_object_with_stats(&self, object: &Value) -> Result<Option<(Value, DispatchStats)>> {
        let (version, kind) = self.profile.discriminators(object);
        let Some(rules) = self.profile.rules(&version, &kind)? else {
            warn!(version = %version, kind = %kind, "Skipping object of unconverted kind");
            return Ok(None);
        };
        self.profile.check(object, &version, &kind)?;

        let claims = |path: &Path| rules.claims(path);
        let mut walker = Walker::with_claims(&claims);
        walker.walk(object, &Path::root());
        let bindings = self.profile.ordering().sort(walker.into_paths());
        debug!(version = %version, kind = %kind, bindings = bindings.len(), rules = rules.len(), "Converting object");

        let fallback = self.profile.extensions().fallback();
        let mut doc = Value::Object(Map::new());
        let mut stats = DispatchStats::default();
        for (path, value) in &bindings {
            stats.record(rules.convert(&mut doc, path, value, fallback)?);
        }
        self.profile.finalize(&mut doc, object)?;

        debug!(
            exact = stats.exact,
            pattern = stats.pattern,
            fallback = stats.fallback,
            "Object converted"
        );
        Ok(Some((doc, stats)))
    }

    /// Convert a batch in order, stopping at the first failing object
    ///
    /// Skipped kinds produce no output entry.
    pub fn convert_all(&self, objects: &[Value]) -> Result<Vec<Value>> {
        let mut converted = Vec::with_capacity(objects.len());
        for (index, object) in objects.iter().enumerate() {
            if let Some(doc) = self.convert_indexed(index, object)? {
                converted.push(doc);
            }
        }
        Ok(converted)
    }

    /// Convert a batch concurrently, keeping input order
    ///
    /// On failure the error of the lowest-indexed failing object is returned.
    #[cfg(feature = "parallel")]
    pub fn par_convert_all(&self, objects: &[Value]) -> Result<Vec<Value>> {
        use rayon::prelude::*;

        let results: Vec<Result<Option<Value>>> = objects
            .par_iter()
            .enumerate()
            .map(|(index, object)| self.convert_indexed(index, object))
            .collect();
        let mut converted = Vec::with_capacity(results.len());
        for result in results {
            if let Some(doc) = result? {
                converted.push(doc);
            }
        }
        Ok(converted)
    }

    fn convert_indexed(&self, index: usize, object: &Value) -> Result<Option<Value>> {
        self.convert_object(object).map_err(|source| Error::Object {
            index,
            name: self.profile.object_name(object),
            source: Box::new(source),
        })
    }
}
