//! Rule registry and dispatch
//!
//! A [`Rules`] table maps pattern paths to converters for one
//! `(version, kind)` pair. Dispatch tries an exact match on the concrete
//! path first, then scans patterns in ascending textual order, and finally
//! hands unmatched bindings to the extension-field fallback.

use crate::annotations::ExtensionField;
use crate::converter::{Converter, ConverterKind};
use crate::error::Result;
use crate::path::Path;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// A pattern path bound to a converter
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Path,
    converter: Converter,
}

impl Rule {
    pub fn new(pattern: impl Into<Path>, converter: Converter) -> Self {
        Self {
            pattern: pattern.into(),
            converter,
        }
    }

    pub fn pattern(&self) -> &Path {
        &self.pattern
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }
}

/// Which lookup tier selected the converter for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Pattern,
    Fallback,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Exact => f.write_str("exact"),
            MatchTier::Pattern => f.write_str("pattern"),
            MatchTier::Fallback => f.write_str("fallback"),
        }
    }
}

/// Listing entry produced by [`Rules::describe`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescription {
    pub pattern: String,
    pub converter: ConverterKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Rule table for one `(version, kind)` pair
///
/// Patterns are unique by their normalized text; inserting a pattern that
/// is already present replaces its converter.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    rules: BTreeMap<String, Rule>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Rules::insert`]
    pub fn with(mut self, pattern: &str, converter: Converter) -> Self {
        self.insert(pattern, converter);
        self
    }

    pub fn insert(&mut self, pattern: &str, converter: Converter) {
        let rule = Rule::new(pattern, converter);
        self.rules.insert(rule.pattern.to_string(), rule);
    }

    /// Merge tables in order; later tables win on duplicate patterns
    pub fn merge<'a>(tables: impl IntoIterator<Item = &'a Rules>) -> Rules {
        let mut merged = Rules::new();
        for table in tables {
            merged.extend_from(table);
        }
        merged
    }

    /// Copy every rule of `other` into this table, replacing duplicates
    pub fn extend_from(&mut self, other: &Rules) {
        for (text, rule) in &other.rules {
            self.rules.insert(text.clone(), rule.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn get(&self, pattern: &str) -> Option<&Rule> {
        self.rules.get(&Path::parse(pattern).to_string())
    }

    /// Rule responsible for `path`, without the fallback tier
    pub fn lookup(&self, path: &Path) -> Option<(&Rule, MatchTier)> {
        if let Some(rule) = self.rules.get(&path.to_string()) {
            return Some((rule, MatchTier::Exact));
        }
        self.rules
            .values()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| (rule, MatchTier::Pattern))
    }

    /// Whether some rule consumes the value at `path`
    pub fn claims(&self, path: &Path) -> bool {
        self.lookup(path).is_some()
    }

    /// Dispatch one binding to its converter
    ///
    /// Bindings no rule matches are stored through `fallback`, so no source
    /// data is dropped unless a rule discards it explicitly.
    pub fn convert(
        &self,
        doc: &mut Value,
        path: &Path,
        value: &Value,
        fallback: &ExtensionField,
    ) -> Result<MatchTier> {
        match self.lookup(path) {
            Some((rule, tier)) => {
                trace!(path = %path, rule = %rule.pattern, converter = %rule.converter.kind(), tier = %tier, "Dispatching");
                rule.converter.apply(doc, path, value)?;
                Ok(tier)
            }
            None => {
                trace!(path = %path, namespace = fallback.namespace(), "No rule matched, storing extension field");
                fallback.write(doc, path, value)?;
                Ok(MatchTier::Fallback)
            }
        }
    }

    /// Patterns with their converter kinds, in pattern order
    pub fn describe(&self) -> Vec<RuleDescription> {
        self.rules
            .iter()
            .map(|(pattern, rule)| RuleDescription {
                pattern: pattern.clone(),
                converter: rule.converter.kind(),
                target: rule.converter.target(),
            })
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, Converter)> for Rules {
    fn from_iter<I: IntoIterator<Item = (&'a str, Converter)>>(iter: I) -> Self {
        let mut rules = Rules::new();
        for (pattern, converter) in iter {
            rules.insert(pattern, converter);
        }
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fallback() -> ExtensionField {
        ExtensionField::new("metadata.annotations", "src/")
    }

    #[test]
    fn test_exact_match_beats_pattern() {
        let rules = Rules::new()
            .with("a.#.b", Converter::rename("pattern"))
            .with("a.0.b", Converter::rename("exact"));
        let mut doc = json!({});
        let tier = rules
            .convert(&mut doc, &Path::parse("a.0.b"), &json!(1), &fallback())
            .unwrap();
        assert_eq!(tier, MatchTier::Exact);
        assert_eq!(doc, json!({"exact": 1}));

        let tier = rules
            .convert(&mut doc, &Path::parse("a.1.b"), &json!(2), &fallback())
            .unwrap();
        assert_eq!(tier, MatchTier::Pattern);
        assert_eq!(doc, json!({"exact": 1, "pattern": 2}));
    }

    #[test]
    fn test_unmatched_path_goes_to_fallback_only() {
        let rules = Rules::new().with("kind", Converter::Identity);
        let mut doc = json!({});
        let tier = rules
            .convert(&mut doc, &Path::parse("spec.unknown"), &json!("v"), &fallback())
            .unwrap();
        assert_eq!(tier, MatchTier::Fallback);
        assert_eq!(doc, json!({"metadata": {"annotations": {"src/spec.unknown": "v"}}}));
    }

    #[test]
    fn test_discard_does_not_fall_through() {
        let rules = Rules::new().with("spec.ignored", Converter::Discard);
        let mut doc = json!({});
        rules
            .convert(&mut doc, &Path::parse("spec.ignored"), &json!(1), &fallback())
            .unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_merge_last_writer_wins() {
        let common = Rules::new()
            .with("kind", Converter::Identity)
            .with("metadata.name", Converter::Identity);
        let specific = Rules::new().with("kind", Converter::constant(json!("Agent")));
        let merged = Rules::merge([&common, &specific]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("kind").unwrap().converter().kind(), ConverterKind::Transform);
    }

    #[test]
    fn test_patterns_are_normalized() {
        let rules = Rules::new()
            .with("a.b", Converter::Identity)
            .with("a.b", Converter::Discard);
        assert_eq!(rules.len(), 1);
        assert!(rules.get("a.b").is_some());
    }

    #[test]
    fn test_claims() {
        let rules: Rules = [
            ("metadata.annotations", Converter::Identity),
            ("spec.items.#", Converter::Identity),
        ]
        .into_iter()
        .collect();
        assert!(rules.claims(&Path::parse("metadata.annotations")));
        assert!(rules.claims(&Path::parse("spec.items.3")));
        assert!(!rules.claims(&Path::parse("spec.items")));
    }

    #[test]
    fn test_describe_is_sorted() {
        let rules = Rules::new()
            .with("spec.b", Converter::rename("x.y"))
            .with("spec.a", Converter::Identity);
        let described = rules.describe();
        assert_eq!(described[0].pattern, "spec.a");
        assert_eq!(described[1].target.as_deref(), Some("x.y"));
        assert_eq!(
            serde_json::to_value(&described[0]).unwrap(),
            json!({"pattern": "spec.a", "converter": "identity"})
        );
    }
}
