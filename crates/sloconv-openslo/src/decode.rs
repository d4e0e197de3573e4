//! Decoding OpenSLO text into JSON-shaped objects

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Text format of an OpenSLO input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Yaml,
    Json,
}

impl InputFormat {
    /// Guess the format from a file extension, defaulting to YAML
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Yaml,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Yaml => f.write_str("YAML"),
            InputFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Decode every OpenSLO object in `text`
///
/// YAML input may hold several documents; a document that is a sequence
/// contributes each of its items. JSON input is a single object or an array
/// of objects. Empty documents are ignored.
pub fn decode(text: &str, format: InputFormat) -> Result<Vec<Value>> {
    if text.trim().is_empty() {
        return Err(Error::NoObjects);
    }
    let documents = match format {
        InputFormat::Json => vec![serde_json::from_str::<Value>(text).map_err(|e| decode_error(format, e))?],
        InputFormat::Yaml => serde_yaml::Deserializer::from_str(text)
            .map(|document| Value::deserialize(document).map_err(|e| decode_error(format, e)))
            .collect::<Result<Vec<_>>>()?,
    };

    let mut objects = Vec::new();
    for document in documents {
        match document {
            Value::Null => {}
            Value::Array(items) => objects.extend(items),
            other => objects.push(other),
        }
    }
    if objects.is_empty() {
        return Err(Error::NoObjects);
    }
    if let Some((index, found)) = objects.iter().enumerate().find(|(_, o)| !o.is_object()) {
        return Err(Error::NotAnObject {
            index,
            found: sloconv_core::error::value_type_name(found).to_string(),
        });
    }
    Ok(objects)
}

fn decode_error(format: InputFormat, err: impl fmt::Display) -> Error {
    Error::Decode {
        format: format.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_yaml_documents() {
        let text = "\
apiVersion: openslo/v1
kind: Service
metadata:
  name: a
---
- apiVersion: openslo/v1
  kind: Service
  metadata:
    name: b
- apiVersion: openslo/v1
  kind: Service
  metadata:
    name: c
";
        let objects = decode(text, InputFormat::Yaml).unwrap();
        let names: Vec<_> = objects.iter().map(|o| o["metadata"]["name"].clone()).collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_decode_json() {
        let objects = decode(r#"[{"kind": "SLO"}, {"kind": "Service"}]"#, InputFormat::Json).unwrap();
        assert_eq!(objects.len(), 2);
        let objects = decode(r#"{"kind": "SLO"}"#, InputFormat::Json).unwrap();
        assert_eq!(objects, vec![json!({"kind": "SLO"})]);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode("", InputFormat::Yaml), Err(Error::NoObjects)));
        assert!(matches!(
            decode("[1]", InputFormat::Json),
            Err(Error::NotAnObject { index: 0, .. })
        ));
        assert!(matches!(
            decode("{", InputFormat::Json),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(InputFormat::from_path(std::path::Path::new("slo.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(std::path::Path::new("slo.yml")), InputFormat::Yaml);
    }
}
