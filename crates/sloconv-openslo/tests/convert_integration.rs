//! Integration tests converting complete OpenSLO documents into Nobl9

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sloconv_core::Error as CoreError;
use sloconv_openslo::{convert_str, ConversionOptions, Error, InputFormat};

fn convert(yaml: &str) -> Vec<Value> {
    convert_str(yaml, InputFormat::Yaml, &ConversionOptions::default()).unwrap()
}

fn convert_err(yaml: &str) -> Error {
    convert_str(yaml, InputFormat::Yaml, &ConversionOptions::default()).unwrap_err()
}

const RATIO_SLO: &str = r#"
apiVersion: openslo/v1
kind: SLO
metadata:
  name: web-availability
  displayName: Web availability
  labels:
    team: [sre]
  annotations:
    nobl9.com/metadata.project: web
    owner: sre-team
spec:
  description: 99% of requests succeed
  service: web
  budgetingMethod: Occurrences
  indicator:
    metadata:
      name: web-success-ratio
    spec:
      ratioMetric:
        counter: true
        good:
          metricSource:
            metricSourceRef: prometheus-main
            type: prometheus
            spec:
              promql: 'sum(http_requests{code!~"5.."})'
        total:
          metricSource:
            metricSourceRef: prometheus-main
            type: prometheus
            spec:
              promql: 'sum(http_requests)'
  timeWindow:
    - duration: 28d
      isRolling: true
  objectives:
    - displayName: Good
      target: 0.99
      value: 1
    - displayName: Excellent
      target: 0.999
      value: 2
  alertPolicies:
    - fast-burn
"#;

#[test]
fn test_ratio_slo() {
    let objects = convert(RATIO_SLO);
    let count_metrics = json!({
        "incremental": true,
        "good": {"prometheus": {"promql": "sum(http_requests{code!~\"5..\"})"}},
        "total": {"prometheus": {"promql": "sum(http_requests)"}}
    });
    assert_eq!(
        objects,
        vec![json!({
            "apiVersion": "n9/v1alpha",
            "kind": "SLO",
            "metadata": {
                "name": "web-availability",
                "displayName": "Web availability",
                "labels": {"team": ["sre"]},
                "project": "web",
                "annotations": {
                    "owner": "sre-team",
                    "openslo.com/apiVersion": "openslo/v1",
                    "openslo.com/spec.alertPolicies.0": "fast-burn",
                    "openslo.com/spec.indicator.metadata.name": "web-success-ratio"
                }
            },
            "spec": {
                "description": "99% of requests succeed",
                "service": "web",
                "budgetingMethod": "Occurrences",
                "indicator": {"metricSource": {"name": "prometheus-main"}},
                "timeWindows": [{"unit": "Day", "count": 28, "isRolling": true}],
                "objectives": [
                    {"displayName": "Good", "target": 0.99, "value": 1, "countMetrics": count_metrics},
                    {"displayName": "Excellent", "target": 0.999, "value": 2, "countMetrics": count_metrics}
                ]
            }
        })]
    );
}

#[test]
fn test_threshold_slo_with_calendar_window() {
    let objects = convert(
        r#"
apiVersion: openslo/v1
kind: SLO
metadata:
  name: latency
spec:
  service: api
  budgetingMethod: Timeslices
  indicator:
    metadata:
      name: latency-p99
    spec:
      thresholdMetric:
        metricSource:
          metricSourceRef: datadog-eu
          type: datadog
          spec:
            query: 'p99:trace.http.request{service:api}'
  timeWindow:
    - duration: 1M
      isRolling: false
      calendar:
        startTime: '2024-01-01 00:00:00'
        timeZone: UTC
  objectives:
    - op: lte
      value: 250
      target: 0.95
      timeSliceTarget: 0.9
      timeSliceWindow: 1m
"#,
    );
    let spec = &objects[0]["spec"];
    assert_eq!(
        spec["timeWindows"],
        json!([{
            "unit": "Month",
            "count": 1,
            "isRolling": false,
            "calendar": {"startTime": "2024-01-01 00:00:00", "timeZone": "UTC"}
        }])
    );
    assert_eq!(
        spec["objectives"],
        json!([{
            "op": "lte",
            "value": 250,
            "target": 0.95,
            "timeSliceTarget": 0.9,
            "timeSliceWindow": "1m",
            "rawMetric": {"query": {"datadog": {"query": "p99:trace.http.request{service:api}"}}}
        }])
    );
    assert_eq!(spec["indicator"]["metricSource"]["name"], json!("datadog-eu"));
}

#[test]
fn test_alert_policy() {
    let objects = convert(
        r#"
apiVersion: openslo/v1
kind: AlertPolicy
metadata:
  name: fast-burn
spec:
  description: Fast burn
  alertWhenBreaching: true
  conditions:
    - kind: AlertCondition
      metadata:
        name: burn-2x
      spec:
        severity: page
        condition:
          kind: burnrate
          op: gte
          threshold: 2
          lookbackWindow: 1h
          alertAfter: 5m
  notificationTargets:
    - targetRef: slack-sre
"#,
    );
    assert_eq!(
        objects,
        vec![json!({
            "apiVersion": "n9/v1alpha",
            "kind": "AlertPolicy",
            "metadata": {
                "name": "fast-burn",
                "project": "default",
                "annotations": {
                    "openslo.com/apiVersion": "openslo/v1",
                    "openslo.com/spec.alertWhenBreaching": true,
                    "openslo.com/spec.conditions.0.kind": "AlertCondition",
                    "openslo.com/spec.conditions.0.metadata.name": "burn-2x"
                }
            },
            "spec": {
                "description": "Fast burn",
                "severity": "page",
                "conditions": [{
                    "measurement": "averageBurnRate",
                    "op": "gte",
                    "value": 2,
                    "alertingWindow": "1h",
                    "lastsFor": "5m"
                }],
                "alertMethods": [{"metadata": {"name": "slack-sre"}}]
            }
        })]
    );
}

#[test]
fn test_data_source_becomes_agent() {
    let objects = convert(
        r#"
apiVersion: openslo/v1
kind: DataSource
metadata:
  name: datadog-eu
spec:
  type: datadog
  description: EU site
  connectionDetails:
    site: datadoghq.eu
"#,
    );
    assert_eq!(
        objects[0],
        json!({
            "apiVersion": "n9/v1alpha",
            "kind": "Agent",
            "metadata": {
                "name": "datadog-eu",
                "project": "default",
                "annotations": {"openslo.com/apiVersion": "openslo/v1"}
            },
            "spec": {"datadog": {"site": "datadoghq.eu"}, "description": "EU site"}
        })
    );
}

#[test]
fn test_data_source_direct_override() {
    let objects = convert(
        r#"
apiVersion: openslo/v1
kind: DataSource
metadata:
  name: datadog-direct
  annotations:
    nobl9.com/kind: Direct
spec:
  type: datadog
  connectionDetails:
    site: datadoghq.com
"#,
    );
    assert_eq!(objects[0]["kind"], json!("Direct"));
    assert_eq!(objects[0]["spec"], json!({"datadog": {"site": "datadoghq.com"}}));
}

#[test]
fn test_alert_notification_target() {
    let objects = convert(
        r#"
apiVersion: openslo/v1
kind: AlertNotificationTarget
metadata:
  name: slack-sre
spec:
  target: slack
  description: SRE channel
"#,
    );
    assert_eq!(objects[0]["kind"], json!("AlertMethod"));
    assert_eq!(
        objects[0]["spec"],
        json!({"slack": {}, "description": "SRE channel"})
    );
}

#[test]
fn test_sli_is_skipped_in_batch() {
    let objects = convert(
        r#"
apiVersion: openslo/v1
kind: SLI
metadata:
  name: ratio
spec:
  ratioMetric:
    counter: true
---
apiVersion: openslo/v1
kind: Service
metadata:
  name: web
spec:
  description: Web frontend
"#,
    );
    assert_eq!(
        objects,
        vec![json!({
            "apiVersion": "n9/v1alpha",
            "kind": "Service",
            "metadata": {
                "name": "web",
                "project": "default",
                "annotations": {"openslo.com/apiVersion": "openslo/v1"}
            },
            "spec": {"description": "Web frontend"}
        })]
    );
}

#[test]
fn test_options_change_post_step() {
    let options = ConversionOptions {
        default_project: "platform".to_string(),
        record_source_version: false,
    };
    let objects = convert_str(
        "apiVersion: openslo/v1\nkind: Service\nmetadata:\n  name: web\n",
        InputFormat::Yaml,
        &options,
    )
    .unwrap();
    assert_eq!(
        objects[0],
        json!({
            "apiVersion": "n9/v1alpha",
            "kind": "Service",
            "metadata": {"name": "web", "project": "platform"}
        })
    );
}

#[test]
fn test_batch_reports_failing_object() {
    let err = convert_err(
        r#"
apiVersion: openslo/v1
kind: Service
metadata:
  name: ok
---
apiVersion: openslo/v1
kind: AlertPolicy
metadata:
  name: threshold-policy
spec:
  conditions:
    - spec:
        condition:
          kind: threshold
"#,
    );
    assert_eq!(
        err.to_string(),
        "Failed to convert object #1 (threshold-policy): Conversion of spec.conditions.0.spec.condition.kind failed: unsupported condition kind 'threshold', only 'burnrate' is supported"
    );
    assert!(matches!(err.core(), Some(CoreError::Transform { .. })));
}

#[test]
fn test_unsupported_version_and_kind() {
    let err = convert_err("apiVersion: openslo/v2alpha\nkind: SLO\n");
    assert!(matches!(err.core(), Some(CoreError::UnsupportedVersion { .. })));

    let err = convert_err("apiVersion: openslo/v1\nkind: Project\n");
    assert!(matches!(err.core(), Some(CoreError::UnsupportedKind { .. })));
}

#[test]
fn test_reserved_override_is_rejected() {
    let err = convert_err(
        r#"
apiVersion: openslo/v1
kind: Service
metadata:
  name: web
  annotations:
    nobl9.com/kind: Project
"#,
    );
    assert!(matches!(err.core(), Some(CoreError::Precondition { .. })));
}

#[test]
fn test_override_index_far_past_array_end_is_an_error() {
    for index in ["18446744073709551615", "4000000000"] {
        let err = convert_err(&format!(
            r#"
apiVersion: openslo/v1
kind: Service
metadata:
  name: web
  annotations:
    nobl9.com/spec.items.{index}: x
"#
        ));
        assert!(matches!(err.core(), Some(CoreError::Write { .. })), "{err}");
    }
}

#[test]
fn test_invalid_duration() {
    let err = convert_err(
        r#"
apiVersion: openslo/v1
kind: SLO
metadata:
  name: broken
spec:
  timeWindow:
    - duration: 4 weeks
"#,
    );
    assert!(err.to_string().contains("failed to parse 4 weeks as a duration shorthand"));
}

#[test]
fn test_conversion_is_byte_identical() {
    let first = serde_json::to_string(&convert(RATIO_SLO)).unwrap();
    let second = serde_json::to_string(&convert(RATIO_SLO)).unwrap();
    assert_eq!(first, second);
}
