//! Document flattener
//!
//! Walks a decoded JSON document depth-first and produces the set of
//! concrete `(path, value)` bindings reachable from it. Containers are
//! descended into unless a claim predicate says a rule consumes the
//! container whole, in which case the container itself is the binding.

use crate::path::{Path, Segment};
use serde_json::Value;
use std::collections::HashMap;

/// Flattened bindings of one document, keyed by concrete path
pub type Bindings = HashMap<Path, Value>;

/// Depth-first document flattener
pub struct Walker<'a> {
    paths: Bindings,
    claims: Option<&'a dyn Fn(&Path) -> bool>,
}

impl<'a> Walker<'a> {
    /// Create a walker that records only primitive leaves
    pub fn new() -> Self {
        Self {
            paths: HashMap::new(),
            claims: None,
        }
    }

    /// Stop descending at containers for which `claims` returns true
    pub fn with_claims(claims: &'a dyn Fn(&Path) -> bool) -> Self {
        Self {
            paths: HashMap::new(),
            claims: Some(claims),
        }
    }

    /// Walk `value`, prefixing every produced path with `prefix`
    pub fn walk(&mut self, value: &Value, prefix: &Path) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.visit(child, prefix.child(Segment::Key(key.clone())));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.visit(child, prefix.child(Segment::Index(index)));
                }
            }
            _ => {}
        }
    }

    fn visit(&mut self, value: &Value, path: Path) {
        let is_container = value.is_object() || value.is_array();
        if !is_container || self.claims.is_some_and(|claims| claims(&path)) {
            self.paths.insert(path, value.clone());
            return;
        }
        self.walk(value, &path);
    }

    pub fn paths(&self) -> &Bindings {
        &self.paths
    }

    pub fn into_paths(self) -> Bindings {
        self.paths
    }
}

impl Default for Walker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten `value` into primitive leaf bindings
pub fn flatten(value: &Value) -> Bindings {
    let mut walker = Walker::new();
    walker.walk(value, &Path::root());
    walker.into_paths()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn textual(bindings: &Bindings) -> Vec<(String, Value)> {
        let mut pairs: Vec<_> = bindings
            .iter()
            .map(|(p, v)| (p.to_string(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    #[test]
    fn test_flatten_nested() {
        let doc = json!({
            "kind": "SLO",
            "metadata": {"name": "latency", "labels": {"team": ["a", "b"]}},
            "spec": {"objectives": [{"target": 0.99}, {"target": 0.95}]}
        });
        let bindings = flatten(&doc);
        assert_eq!(
            textual(&bindings),
            vec![
                ("kind".to_string(), json!("SLO")),
                ("metadata.labels.team.0".to_string(), json!("a")),
                ("metadata.labels.team.1".to_string(), json!("b")),
                ("metadata.name".to_string(), json!("latency")),
                ("spec.objectives.0.target".to_string(), json!(0.99)),
                ("spec.objectives.1.target".to_string(), json!(0.95)),
            ]
        );
    }

    #[test]
    fn test_empty_containers_vanish() {
        let doc = json!({"a": {}, "b": [], "c": null});
        let bindings = flatten(&doc);
        assert_eq!(textual(&bindings), vec![("c".to_string(), Value::Null)]);
    }

    #[test]
    fn test_claimed_container_is_kept_whole() {
        let doc = json!({
            "metadata": {"annotations": {"x.y": "1", "z": "2"}, "name": "n"}
        });
        let claimed = Path::parse("metadata.annotations");
        let claims = |p: &Path| *p == claimed;
        let mut walker = Walker::with_claims(&claims);
        walker.walk(&doc, &Path::root());
        assert_eq!(
            textual(walker.paths()),
            vec![
                ("metadata.annotations".to_string(), json!({"x.y": "1", "z": "2"})),
                ("metadata.name".to_string(), json!("n")),
            ]
        );
    }

    #[test]
    fn test_keys_with_dots_are_escaped() {
        let doc = json!({"annotations": {"openslo.com/owner": "me"}});
        let bindings = flatten(&doc);
        let (path, _) = bindings.iter().next().unwrap();
        assert_eq!(path.to_string(), "annotations.openslo\\.com/owner");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_prefix_is_applied() {
        let doc = json!({"a": 1});
        let mut walker = Walker::new();
        walker.walk(&doc, &Path::parse("root.0"));
        assert!(walker.paths().contains_key(&Path::parse("root.0.a")));
    }
}
