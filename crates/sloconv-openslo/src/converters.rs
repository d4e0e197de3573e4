//! Domain converters referenced by the OpenSLO rule tables
//!
//! Each function here has the engine's custom converter signature: it gets
//! the Nobl9 document under construction, the concrete OpenSLO path and the
//! value found there.

use crate::duration::DurationShorthand;
use crate::names::{self, ALERT_METHOD_NAMES, METRIC_SPEC_NAMES};
use serde_json::{json, Map, Value};
use sloconv_core::{setter, Converter, Error, IndexTemplate, Path, Result, Segment};

/// Burn rate measurement name in Nobl9 alert conditions
pub const AVERAGE_BURN_RATE: &str = "averageBurnRate";

/// Only OpenSLO alert condition kind Nobl9 can express
pub const BURNRATE_CONDITION: &str = "burnrate";

/// Which part of an SLI a metric source belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricRole {
    /// `thresholdMetric`
    Raw,
    /// `ratioMetric.total`
    Total,
    /// `ratioMetric.good`
    Good,
    /// `ratioMetric.bad`
    Bad,
}

impl MetricRole {
    /// Objective member the metric spec is written under
    pub fn destination(&self) -> &'static str {
        match self {
            MetricRole::Raw => "spec.objectives.#.rawMetric.query",
            MetricRole::Total => "spec.objectives.#.countMetrics.total",
            MetricRole::Good => "spec.objectives.#.countMetrics.good",
            MetricRole::Bad => "spec.objectives.#.countMetrics.bad",
        }
    }
}

fn expect_str<'a>(path: &Path, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::type_mismatch(path, "string", value))
}

fn expect_object<'a>(path: &Path, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::type_mismatch(path, "object", value))
}

/// Converter copying an SLI metric source into every objective
pub fn metric_source(role: MetricRole) -> Converter {
    Converter::custom(move |doc, path, value| convert_metric_source(role, doc, path, value))
}

/// Write `metricSource.spec` as `<destination>.<type>` on every objective
///
/// The metric source reference becomes the SLO's `spec.indicator.metricSource.name`.
pub fn convert_metric_source(role: MetricRole, doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
    let source = expect_object(path, value)?;
    let metric_type = source
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::transform(path, "metric source has no type"))?;
    names::validate(METRIC_SPEC_NAMES, metric_type, "metric spec", path)?;

    let spec = source
        .get("spec")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    let destination = Path::parse(role.destination()).child(Segment::Key(metric_type.to_string()));
    setter::set(doc, &destination, &spec)?;

    if let Some(reference) = source.get("metricSourceRef") {
        setter::set(doc, &Path::parse("spec.indicator.metricSource.name"), reference)?;
    }
    Ok(())
}

/// Split a duration shorthand into the first time window's unit and count
pub fn convert_time_window_duration(doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
    let text = expect_str(path, value)?;
    let duration: DurationShorthand = text.parse().map_err(|e| {
        Error::transform_with(path, format!("failed to parse {text} as a duration shorthand"), e)
    })?;
    setter::set_indexed(
        doc,
        &Path::parse("spec.timeWindows.0.unit"),
        json!(duration.unit.time_window_unit()),
    )?;
    setter::set_indexed(doc, &Path::parse("spec.timeWindows.0.count"), json!(duration.count))
}

/// Write the data source connection details under `spec.<type>`
///
/// Which names are accepted depends on whether the object becomes an agent
/// or a direct, so the type is checked before conversion starts.
pub fn convert_data_source_spec(doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
    let spec = expect_object(path, value)?;
    let source_type = spec
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::transform(path, "data source has no type"))?;
    let details = spec
        .get("connectionDetails")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    setter::set_indexed(doc, &path.child(Segment::Key(source_type.to_string())), details)?;
    if let Some(description) = spec.get("description") {
        setter::set_indexed(doc, &path.child(Segment::Key("description".to_string())), description.clone())?;
    }
    Ok(())
}

/// Map an alert condition kind onto the Nobl9 measurement
pub fn convert_condition_kind(doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
    let kind = expect_str(path, value)?;
    if kind != BURNRATE_CONDITION {
        return Err(Error::transform(
            path,
            format!("unsupported condition kind '{kind}', only '{BURNRATE_CONDITION}' is supported"),
        ));
    }
    let destination = IndexTemplate::new("spec.conditions.{}.measurement").resolve(path)?;
    setter::set(doc, &destination, &json!(AVERAGE_BURN_RATE))
}

/// Create the alert method member named by the notification target
pub fn convert_notification_target(doc: &mut Value, path: &Path, value: &Value) -> Result<()> {
    let target = expect_str(path, value)?;
    names::validate(ALERT_METHOD_NAMES, target, "alert method", path)?;
    let destination = Path::from_iter([
        Segment::Key("spec".to_string()),
        Segment::Key(target.to_string()),
    ]);
    setter::set_indexed(doc, &destination, Value::Object(Map::new()))
}
