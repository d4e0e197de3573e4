//! Convert command handler

use crate::cli::ConvertArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{format_summary, ConvertSummary, OutputFormatter, OutputWriter};
use serde_json::Value;
use sloconv_openslo::{ConversionOptions, InputFormat};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Argument that reads from stdin
const STDIN: &str = "-";

/// One input read into memory
#[derive(Debug)]
struct Input {
    name: String,
    text: String,
    format: InputFormat,
}

/// Handle the convert command
#[instrument(skip_all, fields(inputs = args.files.len()))]
pub fn handle_convert(args: ConvertArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("convert_command", &format!("{} inputs", args.files.len()));

    if args.files.iter().filter(|f| is_stdin(f)).count() > 1 {
        return Err(Error::invalid_args("stdin ('-') can only be read once"));
    }

    let options = conversion_options(&args, config);
    debug!(?options, "Conversion options");

    let progress = output.progress_bar(args.files.len() as u64, "Converting");
    let mut converted = Vec::new();
    let mut summary = ConvertSummary::default();

    for file in &args.files {
        let input = read_input(file)?;
        if let Some(pb) = &progress {
            pb.set_message(input.name.clone());
        }
        let objects = convert_input(&input, &options, &mut summary)?;
        converted.extend(objects);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!(
        files = summary.files,
        read = summary.objects_read,
        written = summary.objects_written,
        "Conversion completed"
    );

    match &args.save_to {
        Some(path) => {
            let formatted = output.format().format_objects(&converted)?;
            write_file(path, &formatted)?;
            output.success(&format!("✓ Output saved to {}", path.display()))?;
        }
        None => output.objects(&converted)?,
    }
    output.success(&format_summary(&summary))
}

/// Configured options with command-line overrides applied
fn conversion_options(args: &ConvertArgs, config: &Config) -> ConversionOptions {
    let mut options = config.conversion.clone();
    if let Some(project) = &args.project {
        options.default_project = project.clone();
    }
    if args.no_source_version {
        options.record_source_version = false;
    }
    options
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN
}

fn read_input(path: &PathBuf) -> Result<Input> {
    if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(Input {
            name: "<stdin>".to_string(),
            text,
            format: InputFormat::Yaml,
        });
    }
    if !path.exists() {
        return Err(Error::FileNotFound { path: path.clone() });
    }
    debug!(path = %path.display(), "Reading input");
    Ok(Input {
        name: path.display().to_string(),
        text: fs::read_to_string(path)?,
        format: InputFormat::from_path(path),
    })
}

/// Decode and convert one input, stopping at its first failing object
fn convert_input(
    input: &Input,
    options: &ConversionOptions,
    summary: &mut ConvertSummary,
) -> Result<Vec<Value>> {
    let _timer = Timer::with_details("convert_input", &input.name);
    let objects =
        sloconv_openslo::decode(&input.text, input.format).map_err(|e| Error::convert(&input.name, e))?;
    let converted = convert_objects(&objects, options).map_err(|e| Error::convert(&input.name, e))?;
    debug!(
        input = %input.name,
        read = objects.len(),
        written = converted.len(),
        "Input converted"
    );

    summary.files += 1;
    summary.objects_read += objects.len();
    summary.objects_written += converted.len();
    Ok(converted)
}

#[cfg(feature = "parallel")]
fn convert_objects(objects: &[Value], options: &ConversionOptions) -> sloconv_openslo::Result<Vec<Value>> {
    sloconv_openslo::par_convert_objects(objects, options)
}

#[cfg(not(feature = "parallel"))]
fn convert_objects(objects: &[Value], options: &ConversionOptions) -> sloconv_openslo::Result<Vec<Value>> {
    sloconv_openslo::convert_objects(objects, options)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
