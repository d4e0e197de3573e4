//! Logging setup for the Sloconv CLI
//!
//! This module provides:
//! - Subscriber installation (compact, full or JSON, console or file)
//! - A per-invocation run id attached to the root span
//! - Redaction of credentials before documents are traced
//! - Drop-guard timers for operation durations

use crate::config::LoggingSettings;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Run id of the current invocation
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    pub format: LogFormat,
    /// Write to stderr; only errors are logged when false
    pub console: bool,
    /// Optional file output path
    pub file: Option<PathBuf>,
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
    /// Log span close events with their duration
    pub span_events: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact format for everyday use
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::config(format!("Invalid log format: {}", s))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
            span_events: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
                config.span_events = true;
            }
        }

        config
    }

    /// Apply the configuration file's logging section
    ///
    /// The configured level only applies when no verbosity flag was given.
    pub fn merge_settings(&mut self, settings: &LoggingSettings, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &settings.level {
                self.level = level.clone();
            }
        }
        if let Some(format) = settings.format {
            self.format = format;
        }
        if settings.file.is_some() {
            self.file = settings.file.clone();
        }
    }

    /// Apply `SLOCONV_LOG_FORMAT` and `SLOCONV_LOG_FILE`
    ///
    /// `RUST_LOG` is read when the filter is built.
    pub fn merge_with_env(&mut self) {
        if let Ok(format) = std::env::var("SLOCONV_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(_) => eprintln!("Warning: Invalid log format: {}, using default", format),
            }
        }

        if let Ok(file) = std::env::var("SLOCONV_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
    }
}

/// Keeps the background log writer alive until dropped
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the global logging system
pub fn init_logging(config: LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = create_env_filter(&config)?;
    let (writer, guard, ansi) = create_writer(&config)?;
    let span_events = if config.span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(span_events);

    let installed = match config.format {
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(builder.with_ansi(ansi).compact().finish())
        }
        LogFormat::Full => tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish()),
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let run_id = RUN_ID.get_or_init(generate_run_id);
    tracing::debug!(run_id = %run_id, config = ?config, "Logging system initialized");

    Ok(LoggingGuard { _file: guard })
}

fn create_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, Option<WorkerGuard>, bool)> {
    if let Some(path) = &config.file {
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::config(format!("Invalid log file path: {}", path.display())))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        return Ok((BoxMakeWriter::new(writer), Some(guard), false));
    }

    let ansi = config.console && std::io::stderr().is_terminal();
    Ok((BoxMakeWriter::new(std::io::stderr), None, ansi))
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = if config.console || config.file.is_some() {
        config.level.as_str()
    } else {
        "error"
    };
    EnvFilter::try_new(level)
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", level, e)))
}

/// Generate a unique id for this invocation
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Get the current run id
pub fn current_run_id() -> Option<&'static str> {
    RUN_ID.get().map(|s| s.as_str())
}

/// Root span of an invocation, carrying the run id
pub fn run_span(command: &str) -> Span {
    tracing::info_span!(
        "run",
        run_id = current_run_id().unwrap_or("unknown"),
        command = command,
    )
}

/// Create a span for a timed operation
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Redaction of credentials that data source connection details may carry
pub mod redaction {
    use regex::Regex;
    use serde_json::Value;
    use std::sync::OnceLock;

    static SECRET_ASSIGNMENT: OnceLock<Regex> = OnceLock::new();

    fn secret_assignment() -> &'static Regex {
        SECRET_ASSIGNMENT.get_or_init(|| {
            Regex::new(r#"(?i)(api[_-]?key|token|secret|password|passwd)([=:]\s*)['"]?[^\s'",&]+['"]?"#)
                .expect("redaction pattern is a valid regex")
        })
    }

    /// Redact `key=value` style credentials inside a string
    pub fn redact_sensitive(input: &str) -> String {
        secret_assignment()
            .replace_all(input, "$1$2***")
            .into_owned()
    }

    /// Redact credential-looking members of a JSON value in place
    pub fn redact_json_value(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) && !val.is_object() && !val.is_array() {
                        *val = Value::String("***".to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(redact_json_value),
            Value::String(s) => *s = redact_sensitive(s),
            _ => {}
        }
    }

    fn is_sensitive_key(key: &str) -> bool {
        let key = key.to_lowercase();
        ["key", "token", "secret", "password", "passwd", "credential"]
            .iter()
            .any(|marker| key.contains(marker))
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, None),
                operation: operation.to_string(),
            }
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, Some(details)),
                operation: operation.to_string(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed"
            );
        }
    }
}
