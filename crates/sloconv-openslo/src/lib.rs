//! Sloconv OpenSLO - OpenSLO v1 to Nobl9 v1alpha conversion
//!
//! This crate supplies the rule tables, domain converters and post-steps
//! that turn OpenSLO objects into Nobl9 objects with the
//! [`sloconv_core`] engine, plus a small decoder for OpenSLO YAML/JSON
//! text.
//!
//! # Example
//!
//! ```
//! use sloconv_openslo::{convert_str, ConversionOptions, InputFormat};
//!
//! let yaml = "
//! apiVersion: openslo/v1
//! kind: Service
//! metadata:
//!   name: web
//! ";
//! let objects = convert_str(yaml, InputFormat::Yaml, &ConversionOptions::default()).unwrap();
//! assert_eq!(objects[0]["apiVersion"], "n9/v1alpha");
//! assert_eq!(objects[0]["metadata"]["project"], "default");
//! ```
//!
//! Copyright (c) 2025 Sloconv Team
//! Licensed under the Apache-2.0 license

pub mod checks;
pub mod converters;
pub mod decode;
pub mod duration;
pub mod error;
pub mod names;
pub mod options;
pub mod profile;
pub mod rules;
pub mod version;

pub use decode::{decode, InputFormat};
pub use error::{Error, Result};
pub use options::ConversionOptions;
pub use profile::OpenSloProfile;
pub use version::{ApiVersion, Kind};

use serde_json::Value;
use sloconv_core::Engine;

/// Engine configured for OpenSLO to Nobl9 conversion
pub fn engine(options: &ConversionOptions) -> Engine<OpenSloProfile> {
    Engine::new(OpenSloProfile::new(options.clone()))
}

/// Convert decoded OpenSLO objects, stopping at the first failure
pub fn convert_objects(objects: &[Value], options: &ConversionOptions) -> Result<Vec<Value>> {
    Ok(engine(options).convert_all(objects)?)
}

/// Convert decoded OpenSLO objects concurrently, keeping input order
#[cfg(feature = "parallel")]
pub fn par_convert_objects(objects: &[Value], options: &ConversionOptions) -> Result<Vec<Value>> {
    Ok(engine(options).par_convert_all(objects)?)
}

/// Decode OpenSLO text and convert every object in it
pub fn convert_str(text: &str, format: InputFormat, options: &ConversionOptions) -> Result<Vec<Value>> {
    let objects = decode(text, format)?;
    convert_objects(&objects, options)
}
