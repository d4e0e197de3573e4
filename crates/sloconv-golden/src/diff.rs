//! Diff engine for comparing converted documents with their expectations

use colored::*;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use sloconv_core::{Path, Segment};
use std::collections::BTreeSet;

/// Options for diff comparison
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Whether to use colored output
    pub colored: bool,

    /// Unchanged lines kept around each change
    pub context_lines: usize,

    /// Maximum diff lines to show (0 = unlimited)
    pub max_diff_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            colored: true,
            context_lines: 3,
            max_diff_lines: 100,
        }
    }
}

/// Result of a diff operation
#[derive(Debug)]
pub struct DiffResult {
    /// Whether the values match
    pub matches: bool,

    /// Human-readable diff output
    pub diff_output: String,

    pub summary: DiffSummary,
}

/// Summary of diff changes
#[derive(Debug, Default)]
pub struct DiffSummary {
    /// Lines only in the actual output
    pub added: usize,

    /// Lines only in the expectation
    pub removed: usize,

    /// Dotted paths that differ, in walker notation
    pub differing_paths: Vec<String>,
}

/// Engine for comparing JSON values
///
/// Conversion output is deterministic, so values are compared exactly.
pub struct DiffEngine {
    options: DiffOptions,
}

impl DiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// Compare two JSON values
    pub fn compare(&self, expected: &Value, actual: &Value) -> DiffResult {
        if expected == actual {
            return DiffResult {
                matches: true,
                diff_output: String::new(),
                summary: DiffSummary::default(),
            };
        }

        let expected_text = pretty(expected);
        let actual_text = pretty(actual);
        let text_diff = TextDiff::from_lines(&expected_text, &actual_text);

        let mut summary = DiffSummary::default();
        for change in text_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => summary.removed += 1,
                ChangeTag::Insert => summary.added += 1,
                ChangeTag::Equal => {}
            }
        }
        collect_diff_paths(expected, actual, &Path::root(), &mut summary.differing_paths);

        DiffResult {
            matches: false,
            diff_output: self.render(&text_diff),
            summary,
        }
    }

    fn render<'a>(&self, text_diff: &TextDiff<'a, 'a, 'a, str>) -> String {
        let mut output = String::new();
        let header = "=== Diff Output (- expected, + actual) ===";
        if self.options.colored {
            output.push_str(&header.bold().to_string());
        } else {
            output.push_str(header);
        }
        output.push('\n');

        let mut line_count = 0;
        for group in text_diff.grouped_ops(self.options.context_lines) {
            for op in group {
                for change in text_diff.iter_changes(&op) {
                    if self.options.max_diff_lines > 0 && line_count >= self.options.max_diff_lines {
                        output.push_str("... (diff truncated) ...\n");
                        return output;
                    }
                    let line = match change.tag() {
                        ChangeTag::Delete if self.options.colored => {
                            format!("{}{}", "-".red(), change.to_string().red())
                        }
                        ChangeTag::Delete => format!("-{}", change),
                        ChangeTag::Insert if self.options.colored => {
                            format!("{}{}", "+".green(), change.to_string().green())
                        }
                        ChangeTag::Insert => format!("+{}", change),
                        ChangeTag::Equal => format!(" {}", change),
                    };
                    output.push_str(&line);
                    line_count += 1;
                }
            }
        }
        output
    }

    /// Create a simple text diff for error messages
    pub fn simple_diff(&self, expected: &str, actual: &str) -> String {
        let diff = TextDiff::from_lines(expected, actual);
        let mut output = String::new();
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            output.push_str(&format!("{}{}", sign, change));
        }
        output
    }
}

fn pretty(value: &Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    text.push('\n');
    text
}

fn label(path: &Path) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

fn collect_diff_paths(expected: &Value, actual: &Value, path: &Path, paths: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            let keys: BTreeSet<_> = exp.keys().chain(act.keys()).collect();
            for key in keys {
                let child = path.child(Segment::Key(key.clone()));
                match (exp.get(key), act.get(key)) {
                    (Some(e), Some(a)) if e != a => collect_diff_paths(e, a, &child, paths),
                    (Some(_), None) => paths.push(format!("{} (missing in actual)", label(&child))),
                    (None, Some(_)) => paths.push(format!("{} (extra in actual)", label(&child))),
                    _ => {}
                }
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            for (i, (e, a)) in exp.iter().zip(act.iter()).enumerate() {
                if e != a {
                    collect_diff_paths(e, a, &path.child(Segment::Index(i)), paths);
                }
            }
            if exp.len() != act.len() {
                paths.push(format!(
                    "{} (array length mismatch: {} vs {})",
                    label(path),
                    exp.len(),
                    act.len()
                ));
            }
        }
        _ if expected != actual => paths.push(label(path)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain() -> DiffEngine {
        DiffEngine::new(DiffOptions {
            colored: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_equal_values() {
        let value = json!([{"kind": "SLO", "metadata": {"name": "a"}}]);
        let result = plain().compare(&value, &value.clone());
        assert!(result.matches);
        assert!(result.diff_output.is_empty());
    }

    #[test]
    fn test_differing_paths_use_escaped_keys() {
        let expected = json!([{"metadata": {"annotations": {"openslo.com/apiVersion": "openslo/v1"}}}]);
        let actual = json!([{"metadata": {"annotations": {"openslo.com/apiVersion": "openslo/v2"}}, "kind": "SLO"}]);
        let result = plain().compare(&expected, &actual);
        assert!(!result.matches);
        assert_eq!(
            result.summary.differing_paths,
            vec![
                "0.kind (extra in actual)".to_string(),
                "0.metadata.annotations.openslo\\.com/apiVersion".to_string(),
            ]
        );
    }

    #[test]
    fn test_array_length_mismatch() {
        let result = plain().compare(&json!([1, 2]), &json!([1]));
        assert_eq!(
            result.summary.differing_paths,
            vec!["<root> (array length mismatch: 2 vs 1)".to_string()]
        );
        assert!(result.summary.removed > 0);
    }

    #[test]
    fn test_diff_output_is_truncated() {
        let engine = DiffEngine::new(DiffOptions {
            colored: false,
            context_lines: 0,
            max_diff_lines: 2,
        });
        let expected: Vec<_> = (0..10).collect();
        let actual: Vec<_> = (10..20).collect();
        let result = engine.compare(&json!(expected), &json!(actual));
        assert!(result.diff_output.ends_with("... (diff truncated) ...\n"));
    }
}
