//! Output formatting and writing utilities
//!
//! Results (converted objects, rule listings) go to stdout in the chosen
//! format. Status messages go to stderr so converted output stays
//! pipeable.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use serde_json::Value;
use sloconv_core::RuleDescription;
use std::io::{self, Write};
use tracing::trace;

/// Rules applied to one OpenSLO kind
#[derive(Debug, Clone, Serialize)]
pub struct RulesReport {
    pub api_version: String,
    pub kind: String,
    /// The kind is recognized but never converted on its own
    pub skipped: bool,
    pub rules: Vec<RuleDescription>,
}

/// Counts reported after a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvertSummary {
    pub files: usize,
    pub objects_read: usize,
    pub objects_written: usize,
}

impl ConvertSummary {
    pub fn skipped(&self) -> usize {
        self.objects_read.saturating_sub(self.objects_written)
    }
}

/// Formatting of the CLI's result types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format converted objects as one document stream or array
    fn format_objects(&self, objects: &[Value]) -> Result<String>;

    /// Format a rule listing
    fn format_rules(&self, report: &RulesReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_objects(&self, objects: &[Value]) -> Result<String> {
        match self {
            OutputFormat::Human => format_objects_human(objects),
            _ => self.format(&objects),
        }
    }

    fn format_rules(&self, report: &RulesReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_rules_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
    status: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a writer on stdout and stderr
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
            status: Box::new(io::stderr()),
        }
    }

    /// Create an output writer with custom result and status writers
    pub fn with_writers(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
        status: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            writer,
            status,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw result output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of result output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    fn status_line(&mut self, content: &str) -> Result<()> {
        writeln!(self.status, "{}", content)?;
        self.status.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.status_line(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.status_line(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.status_line(&message.green().to_string())
        } else {
            self.status_line(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.use_color {
            self.status_line(&message.yellow().to_string())
        } else {
            self.status_line(&format!("WARNING: {}", message))
        }
    }

    /// Write converted objects in the configured format
    pub fn objects(&mut self, objects: &[Value]) -> Result<()> {
        let mut traced = Value::Array(objects.to_vec());
        redaction::redact_json_value(&mut traced);
        trace!(objects = %traced, "Writing converted objects");

        let formatted = self.format.format_objects(objects)?;
        self.finish(&formatted)
    }

    /// Write a rule listing in the configured format
    pub fn rules(&mut self, report: &RulesReport) -> Result<()> {
        let formatted = self.format.format_rules(report)?;
        self.finish(&formatted)
    }

    fn finish(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress || length < 2 {
            return None;
        }
        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Progress bar style for multi-file conversions
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Converted objects as a YAML document stream
fn format_objects_human(objects: &[Value]) -> Result<String> {
    let mut output = String::new();
    for object in objects {
        output.push_str("---\n");
        output.push_str(&serde_yaml::to_string(object)?);
    }
    Ok(output)
}

/// Rule listing as an aligned table
fn format_rules_human(report: &RulesReport) -> String {
    let mut output = format!("═══ {} {} ═══\n", report.api_version, report.kind);
    if report.skipped {
        output.push_str("Not converted on its own; it is inlined into the objects that reference it.\n");
        return output;
    }

    let width = report
        .rules
        .iter()
        .map(|r| r.pattern.len())
        .max()
        .unwrap_or(0)
        .max("PATTERN".len());
    output.push_str(&format!("{:width$}  CONVERTER\n", "PATTERN"));
    for rule in &report.rules {
        let converter = match &rule.target {
            Some(target) => format!("{} -> {}", rule.converter, target),
            None => rule.converter.to_string(),
        };
        output.push_str(&format!("{:width$}  {}\n", rule.pattern, converter));
    }
    output.push_str(&format!("{} rules\n", report.rules.len()));
    output
}

/// One-line summary of a conversion run
pub fn format_summary(summary: &ConvertSummary) -> String {
    let mut line = format!(
        "✓ Converted {} {} from {} {}",
        summary.objects_written,
        plural(summary.objects_written, "object", "objects"),
        summary.files,
        plural(summary.files, "file", "files"),
    );
    if summary.skipped() > 0 {
        line.push_str(&format!(" ({} skipped)", summary.skipped()));
    }
    line
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
