//! Golden test runner converting corpus inputs and checking expectations

use crate::{
    corpus::{CaseExpectation, CorpusManager, TestCase},
    diff::DiffEngine,
    GoldenConfig, GoldenError, Result,
};
use colored::*;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Result of running a golden test
#[derive(Debug)]
pub struct TestResult {
    /// Corpus-relative id of the case
    pub name: String,

    pub passed: bool,

    /// Error message if failed
    pub error: Option<String>,

    /// Diff output if comparison failed
    pub diff: Option<String>,

    /// Execution time in milliseconds
    pub duration_ms: u64,

    /// Whether `expected.json` was rewritten
    pub updated: bool,

    /// Disabled cases are reported but not run
    pub skipped: bool,
}

impl TestResult {
    fn new(name: String) -> Self {
        Self {
            name,
            passed: true,
            error: None,
            diff: None,
            duration_ms: 0,
            updated: false,
            skipped: false,
        }
    }

    fn failed(name: String, error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
            ..Self::new(name)
        }
    }

    /// Print the test result
    pub fn print(&self, verbose: bool) {
        let status = if self.skipped {
            "SKIP".yellow().bold()
        } else if self.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("{} {} ({}ms)", status, self.name, self.duration_ms);

        if let Some(ref error) = self.error {
            println!("  {}: {}", "Error".red(), error);
        }

        if verbose || !self.passed {
            if let Some(ref diff) = self.diff {
                println!("{}", diff);
            }
        }

        if self.updated {
            println!("  {}", "Expectation updated".yellow());
        }
    }
}

/// Runner for golden tests
pub struct GoldenTestRunner {
    config: GoldenConfig,
    corpus_manager: CorpusManager,
}

impl GoldenTestRunner {
    pub fn new(config: GoldenConfig) -> Self {
        let corpus_manager = CorpusManager::new(&config.corpus_dir);
        Self {
            config,
            corpus_manager,
        }
    }

    /// Run a single case by its corpus-relative id
    pub fn run_test(&self, id: &str) -> Result<TestResult> {
        let test_case = self.corpus_manager.load_by_id(id)?;
        let result = self.run_case(&test_case);

        if self.config.verbose {
            result.print(true);
        }

        if result.passed {
            Ok(result)
        } else {
            Err(GoldenError::TestFailed(format!(
                "Test '{}' failed: {}",
                id,
                result.error.as_deref().unwrap_or("Unknown error")
            )))
        }
    }

    /// Run every case whose id contains `pattern`; `*` selects all
    pub fn run_batch(&self, pattern: &str) -> Result<Vec<TestResult>> {
        let tests: Vec<_> = self
            .corpus_manager
            .discover_tests()?
            .into_iter()
            .filter(|t| pattern == "*" || t.id().contains(pattern))
            .collect();

        if tests.is_empty() {
            return Err(GoldenError::CorpusError(format!(
                "No tests found matching pattern '{}'",
                pattern
            )));
        }

        println!("Running {} tests...\n", tests.len());

        let mut results = Vec::with_capacity(tests.len());
        for test_case in &tests {
            let result = self.run_case(test_case);
            result.print(self.config.verbose);
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.passed).count();
        let skipped = results.iter().filter(|r| r.skipped).count();
        let passed = results.len() - failed - skipped;

        println!("\n{}", "=== Test Summary ===".bold());
        println!(
            "{}: {} passed, {} failed, {} skipped",
            "Results".bold(),
            passed.to_string().green(),
            failed.to_string().red(),
            skipped.to_string().yellow()
        );

        if failed > 0 {
            Err(GoldenError::TestFailed(format!("{} test(s) failed", failed)))
        } else {
            Ok(results)
        }
    }

    /// Run a loaded case, folding every failure into the result
    pub fn run_case(&self, test_case: &TestCase) -> TestResult {
        let start = Instant::now();
        let mut result = if test_case.descriptor.enabled {
            self.execute(test_case)
                .unwrap_or_else(|e| TestResult::failed(test_case.id(), e.to_string()))
        } else {
            TestResult {
                skipped: true,
                ..TestResult::new(test_case.id())
            }
        };
        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    fn execute(&self, test_case: &TestCase) -> Result<TestResult> {
        let input = fs::read_to_string(test_case.input_path())?;
        let outcome = sloconv_openslo::convert_str(&input, test_case.input_format(), &test_case.options());
        let id = test_case.id();

        match (test_case.expectation(), outcome) {
            (CaseExpectation::Output(path), Ok(objects)) => {
                self.check_output(id, &path, Value::Array(objects))
            }
            (CaseExpectation::Output(_), Err(e)) => {
                Ok(TestResult::failed(id, format!("Conversion failed: {}", e)))
            }
            (CaseExpectation::Error(pattern), Err(e)) => {
                let regex = Regex::new(&pattern).map_err(|err| {
                    GoldenError::CorpusError(format!("Invalid error pattern in {}: {}", id, err))
                })?;
                let message = e.to_string();
                if regex.is_match(&message) {
                    Ok(TestResult::new(id))
                } else {
                    let diff = DiffEngine::new(self.config.diff_options.clone())
                        .simple_diff(&format!("{pattern}\n"), &format!("{message}\n"));
                    Ok(TestResult {
                        diff: Some(diff),
                        ..TestResult::failed(id, "Error did not match the expected pattern")
                    })
                }
            }
            (CaseExpectation::Error(pattern), Ok(_)) => Ok(TestResult::failed(
                id,
                format!("Conversion succeeded but an error matching '{}' was expected", pattern),
            )),
        }
    }

    fn check_output(&self, id: String, path: &Path, actual: Value) -> Result<TestResult> {
        if !path.exists() {
            if self.config.update_expectations {
                write_expectation(path, &actual)?;
                return Ok(TestResult {
                    updated: true,
                    ..TestResult::new(id)
                });
            }
            return Err(GoldenError::Mismatch(format!(
                "{} does not exist. Run with UPDATE_GOLDEN=1 to create it.",
                path.display()
            )));
        }

        let expected: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        let diff = DiffEngine::new(self.config.diff_options.clone()).compare(&expected, &actual);

        if diff.matches {
            Ok(TestResult::new(id))
        } else if self.config.update_expectations {
            write_expectation(path, &actual)?;
            Ok(TestResult {
                diff: Some(diff.diff_output),
                updated: true,
                ..TestResult::new(id)
            })
        } else {
            Ok(TestResult {
                diff: Some(diff.diff_output),
                ..TestResult::failed(
                    id,
                    format!("Output differs at {}", diff.summary.differing_paths.join(", ")),
                )
            })
        }
    }

    /// List all available case ids
    pub fn list_tests(&self) -> Result<Vec<String>> {
        Ok(self
            .corpus_manager
            .discover_tests()?
            .iter()
            .map(TestCase::id)
            .collect())
    }
}

fn write_expectation(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}
