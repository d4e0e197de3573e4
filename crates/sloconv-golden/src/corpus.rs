//! Test corpus management for golden tests

use crate::{GoldenError, Result};
use serde::{Deserialize, Serialize};
use sloconv_openslo::{ConversionOptions, InputFormat};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Descriptor file of a golden case
pub const CASE_FILE: &str = "case.json";

/// Converted output of a case that is expected to succeed
pub const EXPECTED_FILE: &str = "expected.json";

/// Contents of a `case.json` descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDescriptor {
    /// What the case exercises
    #[serde(default)]
    pub description: String,

    /// Input file, relative to the case directory
    #[serde(default = "default_input")]
    pub input: String,

    /// Conversion options; defaults when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ConversionOptions>,

    /// Regex the conversion error must match; the case expects success when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_pattern: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Lower runs first
    #[serde(default = "default_priority")]
    pub priority: u32,
}

fn default_input() -> String {
    "input.yaml".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

/// What a case expects from the conversion
#[derive(Debug, Clone, PartialEq)]
pub enum CaseExpectation {
    /// Output equal to the JSON array stored at this path
    Output(PathBuf),
    /// Failure whose message matches this regex
    Error(String),
}

/// A golden case loaded from the corpus
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Directory name of the case
    pub name: String,

    /// Corpus-relative directory holding the case, e.g. `slo`
    pub category: String,

    /// Case directory
    pub dir: PathBuf,

    pub descriptor: CaseDescriptor,
}

impl TestCase {
    /// Corpus-relative identifier, e.g. `slo/ratio`
    pub fn id(&self) -> String {
        if self.category.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.category, self.name)
        }
    }

    pub fn input_path(&self) -> PathBuf {
        self.dir.join(&self.descriptor.input)
    }

    pub fn input_format(&self) -> InputFormat {
        InputFormat::from_path(&self.input_path())
    }

    pub fn options(&self) -> ConversionOptions {
        self.descriptor.options.clone().unwrap_or_default()
    }

    pub fn expectation(&self) -> CaseExpectation {
        match &self.descriptor.error_pattern {
            Some(pattern) => CaseExpectation::Error(pattern.clone()),
            None => CaseExpectation::Output(self.dir.join(EXPECTED_FILE)),
        }
    }
}

/// Manager for the golden case corpus
pub struct CorpusManager {
    corpus_dir: PathBuf,
}

impl CorpusManager {
    pub fn new(corpus_dir: impl AsRef<Path>) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
        }
    }

    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// Discover every case under the corpus directory, ordered by priority then id
    pub fn discover_tests(&self) -> Result<Vec<TestCase>> {
        if !self.corpus_dir.is_dir() {
            return Err(GoldenError::CorpusError(format!(
                "Corpus directory {} does not exist",
                self.corpus_dir.display()
            )));
        }

        let mut tests = Vec::new();
        for entry in WalkDir::new(&self.corpus_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.file_name() == Some(std::ffi::OsStr::new(CASE_FILE)) {
                match self.load_test_case(path) {
                    Ok(test_case) => tests.push(test_case),
                    Err(e) => {
                        eprintln!("Warning: Failed to load test case {:?}: {}", path, e);
                    }
                }
            }
        }

        tests.sort_by(|a, b| {
            a.descriptor
                .priority
                .cmp(&b.descriptor.priority)
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(tests)
    }

    /// Load the case whose descriptor lives at `path`
    pub fn load_test_case(&self, path: &Path) -> Result<TestCase> {
        let content = fs::read_to_string(path)?;
        let descriptor: CaseDescriptor = serde_json::from_str(&content)?;

        let dir = path
            .parent()
            .ok_or_else(|| GoldenError::CorpusError(format!("{} has no parent", path.display())))?
            .to_path_buf();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = dir
            .parent()
            .and_then(|parent| parent.strip_prefix(&self.corpus_dir).ok())
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();

        Ok(TestCase {
            name,
            category,
            dir,
            descriptor,
        })
    }

    /// Load a case by its corpus-relative id
    pub fn load_by_id(&self, id: &str) -> Result<TestCase> {
        self.load_test_case(&self.corpus_dir.join(id).join(CASE_FILE))
    }

    pub fn filter_by_tags(&self, tests: Vec<TestCase>, tags: &[String]) -> Vec<TestCase> {
        if tags.is_empty() {
            return tests;
        }
        tests
            .into_iter()
            .filter(|t| tags.iter().any(|tag| t.descriptor.tags.contains(tag)))
            .collect()
    }

    /// Create a case directory with its descriptor and input
    pub fn create_case(&self, id: &str, descriptor: &CaseDescriptor, input: &str) -> Result<TestCase> {
        let dir = self.corpus_dir.join(id);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&descriptor.input), input)?;
        let case_path = dir.join(CASE_FILE);
        fs::write(&case_path, serde_json::to_string_pretty(descriptor)?)?;
        self.load_test_case(&case_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn descriptor(input: &str) -> CaseDescriptor {
        serde_json::from_value(serde_json::json!({"input": input})).unwrap()
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor: CaseDescriptor = serde_json::from_str("{}").unwrap();
        assert_eq!(descriptor.input, "input.yaml");
        assert!(descriptor.enabled);
        assert!(descriptor.options.is_none());
        assert!(descriptor.error_pattern.is_none());
    }

    #[test]
    fn test_discover_nested_cases() {
        let temp = TempDir::new().unwrap();
        let corpus = CorpusManager::new(temp.path());
        corpus
            .create_case("slo/ratio", &descriptor("input.yaml"), "kind: SLO\n")
            .unwrap();
        corpus
            .create_case("service", &descriptor("input.json"), "{}")
            .unwrap();

        let tests = corpus.discover_tests().unwrap();
        let ids: Vec<_> = tests.iter().map(TestCase::id).collect();
        assert_eq!(ids, vec!["service", "slo/ratio"]);
        assert_eq!(tests[0].input_format(), InputFormat::Json);
        assert_eq!(
            tests[1].expectation(),
            CaseExpectation::Output(temp.path().join("slo/ratio").join(EXPECTED_FILE))
        );
    }

    #[test]
    fn test_missing_corpus_dir() {
        let corpus = CorpusManager::new("/nonexistent/golden-corpus");
        assert!(matches!(
            corpus.discover_tests(),
            Err(GoldenError::CorpusError(_))
        ));
    }
}
