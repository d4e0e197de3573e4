//! Error types and handling for the CLI

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the conversion engine outside of a conversion run
    #[error(transparent)]
    Core(#[from] sloconv_core::Error),

    /// Converting one of the inputs failed
    #[error("{input}: {source}")]
    Convert {
        input: String,
        #[source]
        source: sloconv_openslo::Error,
    },

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Input could not be decoded
    #[error("Invalid file format for {input}: expected {expected} ({message})")]
    InvalidFormat {
        input: String,
        expected: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML configuration error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Attach the input name to a conversion failure
    ///
    /// Decode failures become [`Error::InvalidFormat`].
    pub fn convert(input: impl Into<String>, source: sloconv_openslo::Error) -> Self {
        let input = input.into();
        match source {
            sloconv_openslo::Error::Decode { format, message } => Self::InvalidFormat {
                input,
                expected: format,
                message,
            },
            source => Self::Convert { input, source },
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::Convert { .. } => 3,
            Self::FileNotFound { .. } => 4,
            Self::InvalidFormat { .. } => 5,
            Self::Config(_) => 6,
            Self::InvalidArgs(_) => 7,
            Self::Json(_) => 8,
            Self::Yaml(_) => 9,
            Self::Toml(_) => 10,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
