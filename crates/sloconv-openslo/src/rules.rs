//! Rule tables for OpenSLO v1
//!
//! Every kind's table is the common table merged with a kind-specific one.
//! Patterns use `#` for "any objective/condition/target"; literal `0`
//! addresses the only time window Nobl9 supports.

use crate::converters::{
    self, convert_condition_kind, convert_data_source_spec, convert_notification_target,
    convert_time_window_duration, MetricRole,
};
use crate::version::{Kind, Nobl9Kind, NOBL9_API_VERSION};
use serde_json::json;
use sloconv_core::{Converter, ExtensionBridge, PathOrdering, Rules};
use std::sync::Arc;

/// Location of the annotation map on both sides
pub const ANNOTATIONS_PATH: &str = "metadata.annotations";

/// Namespace of annotations carrying OpenSLO data Nobl9 does not model
pub const OPENSLO_ANNOTATION_NAMESPACE: &str = "openslo.com/";

/// Prefix of OpenSLO annotations that address Nobl9 fields directly
pub const NOBL9_ANNOTATION_PREFIX: &str = "nobl9.com/";

/// Annotation bridge between OpenSLO and Nobl9 metadata
pub fn extension_bridge() -> ExtensionBridge {
    ExtensionBridge::new(
        ANNOTATIONS_PATH,
        OPENSLO_ANNOTATION_NAMESPACE,
        NOBL9_ANNOTATION_PREFIX,
    )
}

/// Application order for OpenSLO objects
///
/// Metric sources fan out over `spec.objectives`, so they run after the
/// objectives exist. Annotations run last so `nobl9.com/` overrides win.
pub fn path_ordering() -> PathOrdering {
    PathOrdering::new()
        .defer("spec.indicator.spec.ratioMetric")
        .defer("spec.indicator.spec.thresholdMetric")
        .defer(ANNOTATIONS_PATH)
}

/// Rules shared by every kind
pub fn common(bridge: &Arc<ExtensionBridge>) -> Rules {
    Rules::new()
        .with("apiVersion", Converter::constant(json!(NOBL9_API_VERSION)))
        .with("kind", Converter::Identity)
        .with("metadata.name", Converter::Identity)
        .with("metadata.displayName", Converter::Identity)
        .with("metadata.labels", Converter::Identity)
        .with(ANNOTATIONS_PATH, bridge.override_converter())
        .with("spec.description", Converter::Identity)
}

pub fn slo(bridge: &Arc<ExtensionBridge>) -> Rules {
    Rules::new()
        .with("spec.service", Converter::Identity)
        .with("spec.budgetingMethod", Converter::Identity)
        .with(
            "spec.indicator.metadata.name",
            bridge.extension(OPENSLO_ANNOTATION_NAMESPACE),
        )
        .with(
            "spec.indicator.metadata.displayName",
            bridge.extension(OPENSLO_ANNOTATION_NAMESPACE),
        )
        .with(
            "spec.indicator.spec.ratioMetric.counter",
            Converter::rename("spec.objectives.#.countMetrics.incremental"),
        )
        .with(
            "spec.indicator.spec.ratioMetric.total.metricSource",
            converters::metric_source(MetricRole::Total),
        )
        .with(
            "spec.indicator.spec.ratioMetric.good.metricSource",
            converters::metric_source(MetricRole::Good),
        )
        .with(
            "spec.indicator.spec.ratioMetric.bad.metricSource",
            converters::metric_source(MetricRole::Bad),
        )
        .with(
            "spec.indicator.spec.thresholdMetric.metricSource",
            converters::metric_source(MetricRole::Raw),
        )
        .with("spec.objectives.#.displayName", Converter::Identity)
        .with("spec.objectives.#.op", Converter::Identity)
        .with("spec.objectives.#.value", Converter::Identity)
        .with("spec.objectives.#.target", Converter::Identity)
        .with("spec.objectives.#.timeSliceTarget", Converter::Identity)
        .with("spec.objectives.#.timeSliceWindow", Converter::Identity)
        .with(
            "spec.timeWindow.0.duration",
            Converter::custom(convert_time_window_duration),
        )
        .with(
            "spec.timeWindow.0.isRolling",
            Converter::rename("spec.timeWindows.0.isRolling"),
        )
        .with(
            "spec.timeWindow.0.calendar",
            Converter::rename("spec.timeWindows.0.calendar"),
        )
}

pub fn data_source() -> Rules {
    Rules::new()
        .with("kind", Converter::constant(json!(Nobl9Kind::Agent.as_str())))
        .with("spec", Converter::custom(convert_data_source_spec))
}

pub fn alert_policy() -> Rules {
    Rules::new()
        .with(
            "spec.conditions.#.spec.severity",
            Converter::rename("spec.severity"),
        )
        .with(
            "spec.conditions.#.spec.condition.op",
            Converter::indexed("spec.conditions.{}.op"),
        )
        .with(
            "spec.conditions.#.spec.condition.kind",
            Converter::custom(convert_condition_kind),
        )
        .with(
            "spec.conditions.#.spec.condition.threshold",
            Converter::indexed("spec.conditions.{}.value"),
        )
        .with(
            "spec.conditions.#.spec.condition.lookbackWindow",
            Converter::indexed("spec.conditions.{}.alertingWindow"),
        )
        .with(
            "spec.conditions.#.spec.condition.alertAfter",
            Converter::indexed("spec.conditions.{}.lastsFor"),
        )
        .with(
            "spec.notificationTargets.#.targetRef",
            Converter::indexed("spec.alertMethods.{}.metadata.name"),
        )
}

pub fn alert_notification_target() -> Rules {
    Rules::new()
        .with(
            "kind",
            Converter::constant(json!(Nobl9Kind::AlertMethod.as_str())),
        )
        .with("spec.target", Converter::custom(convert_notification_target))
}

/// Complete table for an OpenSLO v1 kind
///
/// Returns `None` for kinds that are not converted on their own.
pub fn v1(kind: Kind, bridge: &Arc<ExtensionBridge>) -> Option<Rules> {
    let common = common(bridge);
    let specific = match kind {
        Kind::Service => return Some(common),
        Kind::Slo => slo(bridge),
        Kind::DataSource => data_source(),
        Kind::AlertPolicy => alert_policy(),
        Kind::AlertNotificationTarget => alert_notification_target(),
        Kind::Sli | Kind::AlertCondition => return None,
    };
    Some(Rules::merge([&common, &specific]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sloconv_core::{ConverterKind, Path};

    fn table(kind: Kind) -> Rules {
        v1(kind, &Arc::new(extension_bridge())).unwrap()
    }

    #[test]
    fn test_skipped_kinds_have_no_table() {
        let bridge = Arc::new(extension_bridge());
        assert!(v1(Kind::Sli, &bridge).is_none());
        assert!(v1(Kind::AlertCondition, &bridge).is_none());
    }

    #[test]
    fn test_kind_specific_rules_override_common() {
        let rules = table(Kind::DataSource);
        assert_eq!(rules.get("kind").unwrap().converter().kind(), ConverterKind::Transform);
        assert_eq!(table(Kind::Service).get("kind").unwrap().converter().kind(), ConverterKind::Identity);
    }

    #[test]
    fn test_slo_claims_metric_sources_whole() {
        let rules = table(Kind::Slo);
        assert!(rules.claims(&Path::parse("spec.indicator.spec.thresholdMetric.metricSource")));
        assert!(rules.claims(&Path::parse("metadata.annotations")));
        assert!(rules.claims(&Path::parse("spec.objectives.3.target")));
        assert!(!rules.claims(&Path::parse("spec.timeWindow.1.duration")));
    }

    #[test]
    fn test_ordering_defers_annotations_last() {
        let ordering = path_ordering();
        let annotations = ordering.rank(&Path::parse(ANNOTATIONS_PATH));
        let metric = ordering.rank(&Path::parse("spec.indicator.spec.thresholdMetric.metricSource"));
        assert!(annotations > metric);
        assert_eq!(ordering.rank(&Path::parse("spec.objectives.0.target")), 0);
    }
}
