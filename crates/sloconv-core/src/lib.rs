//! Sloconv Core - Path-based JSON document transformation engine
//!
//! This crate converts JSON-shaped documents written against one schema into
//! documents of a related schema, field by field, according to declarative
//! rule tables. It knows nothing about any concrete schema; the rule tables
//! and destination conventions come from a [`ConversionProfile`].
//!
//! # Main Components
//!
//! - **Path Model**: segment paths with a `#` positional wildcard
//! - **Walker**: flattens a document into `(path, value)` bindings
//! - **Setter**: writes values through wildcard paths into a document
//! - **Converters**: the closed set of per-binding behaviors
//! - **Rules**: pattern tables with exact, pattern and fallback dispatch
//! - **Ordering**: deterministic application order with defer groups
//! - **Extension bridge**: namespaced side-channel for unmapped data
//!
//! # Example
//!
//! ```
//! use sloconv_core::{Converter, Path, Rules};
//! use serde_json::json;
//!
//! let rules = Rules::new()
//!     .with("kind", Converter::Identity)
//!     .with("spec.items.#.name", Converter::indexed("items.{}.id"));
//! let mut doc = json!({});
//! let fallback = sloconv_core::ExtensionField::new("annotations", "src/");
//! rules
//!     .convert(&mut doc, &Path::parse("spec.items.1.name"), &json!("b"), &fallback)
//!     .unwrap();
//! assert_eq!(doc, json!({"items": [null, {"id": "b"}]}));
//! ```

pub mod annotations;
pub mod converter;
pub mod engine;
pub mod error;
pub mod ordering;
pub mod path;
pub mod registry;
pub mod setter;
pub mod walker;

// Re-export main types for convenience
pub use annotations::{ExtensionBridge, ExtensionField};
pub use converter::{Converter, ConverterKind, CustomFn, IndexTemplate, TransformFn};
pub use engine::{ConversionProfile, DispatchStats, Engine};
pub use error::{Error, Result};
pub use ordering::PathOrdering;
pub use path::{escape_key, generify, match_path, Path, Segment};
pub use registry::{MatchTier, Rule, RuleDescription, Rules};
pub use walker::{flatten, Bindings, Walker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
