//! Golden test infrastructure for the Sloconv converter
//!
//! A golden case is a directory holding an OpenSLO input, a `case.json`
//! descriptor and either an `expected.json` with the converted Nobl9
//! objects or an error pattern the conversion must fail with. Running
//! the corpus with `UPDATE_GOLDEN=1` rewrites the expectations from the
//! current converter output.

pub mod corpus;
pub mod diff;
pub mod runner;

use std::path::PathBuf;
use thiserror::Error;

pub use corpus::{CaseExpectation, CorpusManager, TestCase};
pub use diff::{DiffEngine, DiffOptions, DiffResult};
pub use runner::{GoldenTestRunner, TestResult};

/// Golden test error types
#[derive(Debug, Error)]
pub enum GoldenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expectation mismatch: {0}")]
    Mismatch(String),

    #[error("Corpus error: {0}")]
    CorpusError(String),

    #[error("Test failed: {0}")]
    TestFailed(String),
}

pub type Result<T> = std::result::Result<T, GoldenError>;

/// Configuration for golden tests
#[derive(Debug, Clone)]
pub struct GoldenConfig {
    /// Root directory for test corpus
    pub corpus_dir: PathBuf,

    /// Rewrite `expected.json` files from the converter output
    pub update_expectations: bool,

    /// Diff options
    pub diff_options: DiffOptions,

    /// Verbose output
    pub verbose: bool,
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl Default for GoldenConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("../../golden-corpus"),
            update_expectations: env_flag("UPDATE_GOLDEN").unwrap_or(false),
            diff_options: DiffOptions::default(),
            verbose: false,
        }
    }
}

impl GoldenConfig {
    /// Create config from environment and defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(corpus_dir) = std::env::var("GOLDEN_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(corpus_dir);
        }

        if let Some(verbose) = env_flag("GOLDEN_VERBOSE") {
            config.verbose = verbose;
        }

        config
    }
}

/// Define a test running a single golden case, e.g. `"slo/ratio"`
#[macro_export]
macro_rules! golden_test {
    ($name:ident, $case:expr) => {
        #[test]
        fn $name() {
            use $crate::{GoldenConfig, GoldenTestRunner};

            let runner = GoldenTestRunner::new(GoldenConfig::from_env());
            if let Err(e) = runner.run_test($case) {
                panic!("Golden test failed: {}: {}", $case, e);
            }
        }
    };
}

/// Define a test running every golden case matching a pattern
#[macro_export]
macro_rules! golden_test_batch {
    ($pattern:expr) => {
        #[test]
        fn golden_tests() {
            use $crate::{GoldenConfig, GoldenTestRunner};

            let runner = GoldenTestRunner::new(GoldenConfig::from_env());
            if let Err(e) = runner.run_batch($pattern) {
                panic!("Golden test batch failed: {}: {}", $pattern, e);
            }
        }
    };
}
