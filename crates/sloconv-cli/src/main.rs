//! Sloconv CLI - convert OpenSLO documents into Nobl9 objects
//!
//! This is the main entry point for the Sloconv CLI application, providing
//! commands for converting OpenSLO files and inspecting the conversion
//! rules and configuration.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig, LoggingGuard};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let _guard = match init_logging(&cli, &config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let span = logging::run_span(command_name(&cli.command));
    let result = span.in_scope(|| run(cli, config));

    match result {
        Ok(()) => {}
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &error::Error) -> ! {
    eprintln!("{}", error::format_error(e, control::SHOULD_COLORIZE.should_colorize()));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip_all)]
fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    if let Some(source) = &config.source {
        tracing::info!(path = %source.display(), "Configuration loaded");
    }

    let format = cli.output.unwrap_or(config.output.format);
    let mut output = OutputWriter::new(
        format,
        cli.use_color() && config.output.color,
        cli.quiet,
        config.output.progress,
    );

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Convert(args) => handlers::handle_convert(args, &config, &mut output),
        Commands::Rules(args) => handlers::handle_rules(args, &config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Convert(_) => "convert",
        Commands::Rules(_) => "rules",
        Commands::Config(_) => "config",
        Commands::Completions(_) => "completions",
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<LoggingGuard> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    logging_config.merge_settings(&config.logging, verbosity);
    logging_config.merge_with_env();

    // Quiet mode only logs errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
