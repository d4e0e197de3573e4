//! Preconditions checked on an OpenSLO object before it is converted
//!
//! These only cover what the conversion itself depends on. Everything else
//! is left to OpenSLO and Nobl9 validation.

use crate::names::{AGENT_DATA_SOURCE_NAMES, DIRECT_DATA_SOURCE_NAMES};
use crate::rules::NOBL9_ANNOTATION_PREFIX;
use crate::version::{Kind, Nobl9Kind};
use serde_json::Value;
use sloconv_core::{Error, Result};

/// Indicator members holding a metric source
const METRIC_SOURCE_POINTERS: [&str; 4] = [
    "/spec/indicator/spec/thresholdMetric/metricSource",
    "/spec/indicator/spec/ratioMetric/total/metricSource",
    "/spec/indicator/spec/ratioMetric/good/metricSource",
    "/spec/indicator/spec/ratioMetric/bad/metricSource",
];

fn override_key(field: &str) -> String {
    format!("{NOBL9_ANNOTATION_PREFIX}{field}")
}

/// Nobl9 kind a data source converts to, as chosen by its annotations
pub fn data_source_target(object: &Value) -> Option<&str> {
    object
        .pointer("/metadata/annotations")
        .and_then(|annotations| annotations.get(override_key("kind")))
        .and_then(Value::as_str)
}

/// Collect every violation for an object of `kind`
pub fn violations(object: &Value, kind: Kind) -> Vec<String> {
    let mut violations = Vec::new();
    check_annotations(object, kind, &mut violations);
    match kind {
        Kind::DataSource => check_data_source(object, &mut violations),
        Kind::Slo => check_metric_sources(object, &mut violations),
        _ => {}
    }
    violations
}

/// Reject the object unless it has no violations
pub fn check(object: &Value, kind: Kind) -> Result<()> {
    let violations = violations(object, kind);
    if violations.is_empty() {
        return Ok(());
    }
    Err(Error::Precondition {
        kind: kind.to_string(),
        violations,
    })
}

fn check_annotations(object: &Value, kind: Kind, violations: &mut Vec<String>) {
    let Some(annotations) = object
        .pointer("/metadata/annotations")
        .and_then(Value::as_object)
    else {
        return;
    };
    let api_version = override_key("apiVersion");
    if annotations.contains_key(&api_version) {
        violations.push(format!("metadata.annotations: key '{api_version}' is not allowed"));
    }
    let kind_key = override_key("kind");
    if kind != Kind::DataSource && annotations.contains_key(&kind_key) {
        violations.push(format!("metadata.annotations: key '{kind_key}' is not allowed"));
    }
}

fn check_data_source(object: &Value, violations: &mut Vec<String>) {
    let target = data_source_target(object);
    let names = match target {
        None => AGENT_DATA_SOURCE_NAMES,
        Some(kind) if kind == Nobl9Kind::Agent.as_str() => AGENT_DATA_SOURCE_NAMES,
        Some(kind) if kind == Nobl9Kind::Direct.as_str() => DIRECT_DATA_SOURCE_NAMES,
        Some(other) => {
            violations.push(format!(
                "metadata.annotations.{}: must be one of {}, {} (got '{other}')",
                override_key("kind").replace('.', "\\."),
                Nobl9Kind::Agent,
                Nobl9Kind::Direct
            ));
            return;
        }
    };
    match object.pointer("/spec/type").and_then(Value::as_str) {
        Some(name) if names.contains(&name) => {}
        Some(name) => violations.push(format!(
            "spec.type: unsupported data source type name {name}, try one of: {}",
            names.join(", ")
        )),
        None => violations.push("spec.type: property is required".to_string()),
    }
}

fn check_metric_sources(object: &Value, violations: &mut Vec<String>) {
    for pointer in METRIC_SOURCE_POINTERS {
        let Some(source) = object.pointer(pointer) else {
            continue;
        };
        let reference = source.get("metricSourceRef").and_then(Value::as_str);
        if reference.map_or(true, str::is_empty) {
            violations.push(format!(
                "{}.metricSourceRef: property is required",
                pointer.trim_start_matches('/').replace('/', ".")
            ));
        }
    }
}
