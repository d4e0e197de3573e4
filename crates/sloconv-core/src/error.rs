//! Error types for the Sloconv core engine
//!
//! Every failure aborts the conversion of the whole object it occurred in;
//! the engine never hands back a partially converted document.

use thiserror::Error;

/// Main error type for conversion operations
#[derive(Error, Debug)]
pub enum Error {
    /// No rule registry exists for the schema version
    #[error("Unsupported API version {version}")]
    UnsupportedVersion { version: String },

    /// No rule registry exists for the kind within a known version
    #[error("Unsupported kind {kind} for version {version}")]
    UnsupportedKind { version: String, kind: String },

    /// A converter received a value of the wrong shape
    #[error("Invalid type for {path}: expected {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A Transform or Custom converter rejected the value
    #[error("Conversion of {path} failed: {message}")]
    Transform {
        path: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An indexed destination template needs more indices than the source path has
    #[error("Path {path} is missing an index for template {template}")]
    MissingIndex { path: String, template: String },

    /// Writing into the destination document failed
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    /// A profile rejected the source object before conversion
    #[error("Cannot convert {kind}: {}", .violations.join("; "))]
    Precondition { kind: String, violations: Vec<String> },

    /// Identifies the failing object of a batch
    #[error("Failed to convert object #{index}{}: {source}", object_label(.name))]
    Object {
        index: usize,
        name: Option<String>,
        #[source]
        source: Box<Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a type mismatch error for `path`
    pub fn type_mismatch(
        path: impl ToString,
        expected: impl Into<String>,
        found: &serde_json::Value,
    ) -> Self {
        Error::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            found: value_type_name(found).to_string(),
        }
    }

    /// Create a transform error without an underlying cause
    pub fn transform(path: impl ToString, message: impl Into<String>) -> Self {
        Error::Transform {
            path: path.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a transform error wrapping its cause
    pub fn transform_with(
        path: impl ToString,
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Error::Transform {
            path: path.to_string(),
            message: message.into(),
            source: Some(source.into().into()),
        }
    }

    /// Create a write error
    pub fn write(path: impl ToString, message: impl Into<String>) -> Self {
        Error::Write {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// The innermost error, skipping batch context
    pub fn root(&self) -> &Error {
        match self {
            Error::Object { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

fn object_label(name: &Option<String>) -> String {
    name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default()
}

/// Name of the JSON type of `value`, as used in error messages
pub fn value_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
