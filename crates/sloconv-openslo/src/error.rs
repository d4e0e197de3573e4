//! Error types for the OpenSLO conversion layer

use thiserror::Error;

/// Errors produced while decoding or converting OpenSLO documents
#[derive(Error, Debug)]
pub enum Error {
    /// Engine failure while converting an object
    #[error(transparent)]
    Core(#[from] sloconv_core::Error),

    /// Input text could not be decoded
    #[error("Failed to decode {format} input: {message}")]
    Decode { format: String, message: String },

    /// A decoded document is not an object
    #[error("Document #{index} is not an object (found {found})")]
    NotAnObject { index: usize, found: String },

    /// The input held no documents at all
    #[error("No OpenSLO objects found")]
    NoObjects,
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Engine error at the root of this error, if any
    pub fn core(&self) -> Option<&sloconv_core::Error> {
        match self {
            Error::Core(err) => Some(err.root()),
            _ => None,
        }
    }
}
