//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sloconv - convert OpenSLO documents into Nobl9 objects
///
/// Reads OpenSLO v1 YAML or JSON documents and writes the equivalent
/// Nobl9 v1alpha objects, keeping data Nobl9 cannot model as annotations.
#[derive(Parser, Debug)]
#[command(
    name = "sloconv",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SLOCONV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: configured format, then human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert OpenSLO files into Nobl9 objects
    Convert(ConvertArgs),

    /// Show the conversion rules applied to an OpenSLO kind
    Rules(RulesArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// OpenSLO files (YAML or JSON); `-` reads YAML from stdin
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Write the converted objects to a file instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Project for objects that do not name one
    #[arg(long, value_name = "PROJECT")]
    pub project: Option<String>,

    /// Do not record the source apiVersion as an annotation
    #[arg(long)]
    pub no_source_version: bool,
}

/// Arguments for the rules command
#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// OpenSLO kind, e.g. SLO or DataSource
    #[arg(short, long)]
    pub kind: String,

    /// OpenSLO apiVersion
    #[arg(long, default_value = "openslo/v1")]
    pub api_version: String,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration values
    Show(ConfigShowArgs),

    /// List the configuration files that are searched
    Paths,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable output; converted objects as a YAML document stream
    Human,
    /// Compact JSON array
    Json,
    /// YAML sequence
    Yaml,
    /// Pretty-printed JSON array
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
