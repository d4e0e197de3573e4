//! Field names accepted by Nobl9 for the variant-keyed parts of its schema
//!
//! A Nobl9 metric spec, agent, direct or alert method carries exactly one
//! member named after its integration. These lists must follow the Nobl9
//! manifest definitions.

use sloconv_core::{Error, Result};

/// Members of a Nobl9 SLO metric spec
pub const METRIC_SPEC_NAMES: &[&str] = &[
    "prometheus",
    "datadog",
    "newRelic",
    "appDynamics",
    "splunk",
    "lightstep",
    "splunkObservability",
    "dynatrace",
    "elasticsearch",
    "thousandEyes",
    "graphite",
    "bigQuery",
    "opentsdb",
    "grafanaLoki",
    "cloudWatch",
    "pingdom",
    "amazonPrometheus",
    "redshift",
    "sumoLogic",
    "instana",
    "influxdb",
    "gcm",
    "azureMonitor",
    "generic",
    "honeycomb",
    "logicMonitor",
    "azurePrometheus",
    "coralogix",
];

/// Integrations a Nobl9 agent can be configured for
pub const AGENT_DATA_SOURCE_NAMES: &[&str] = &[
    "prometheus",
    "datadog",
    "newRelic",
    "appDynamics",
    "splunk",
    "lightstep",
    "splunkObservability",
    "dynatrace",
    "thousandEyes",
    "graphite",
    "bigQuery",
    "opentsdb",
    "grafanaLoki",
    "cloudWatch",
    "pingdom",
    "amazonPrometheus",
    "redshift",
    "sumoLogic",
    "instana",
    "influxdb",
    "gcm",
    "azureMonitor",
    "generic",
    "honeycomb",
    "logicMonitor",
    "azurePrometheus",
    "coralogix",
];

/// Integrations a Nobl9 direct can be configured for
pub const DIRECT_DATA_SOURCE_NAMES: &[&str] = &[
    "datadog",
    "newRelic",
    "appDynamics",
    "splunkObservability",
    "thousandEyes",
    "bigQuery",
    "splunk",
    "cloudWatch",
    "pingdom",
    "redshift",
    "sumoLogic",
    "instana",
    "influxdb",
    "gcm",
    "lightstep",
    "dynatrace",
    "azureMonitor",
    "honeycomb",
    "logicMonitor",
];

/// Alert method integrations
pub const ALERT_METHOD_NAMES: &[&str] = &[
    "webhook",
    "pagerduty",
    "slack",
    "discord",
    "opsgenie",
    "servicenow",
    "jira",
    "msteams",
    "email",
];

/// Check that `name` is one of `allowed`
///
/// `what` names the field in the error, e.g. "metric spec".
pub fn validate(allowed: &[&str], name: &str, what: &str, path: impl ToString) -> Result<()> {
    if allowed.contains(&name) {
        return Ok(());
    }
    Err(Error::transform(
        path,
        format!(
            "unsupported {what} name {name}, try one of: {}",
            allowed.join(", ")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_names_exclude_elasticsearch() {
        assert!(METRIC_SPEC_NAMES.contains(&"elasticsearch"));
        assert!(!AGENT_DATA_SOURCE_NAMES.contains(&"elasticsearch"));
        assert_eq!(AGENT_DATA_SOURCE_NAMES.len(), METRIC_SPEC_NAMES.len() - 1);
    }

    #[test]
    fn test_direct_names_are_agent_names() {
        for name in DIRECT_DATA_SOURCE_NAMES {
            assert!(AGENT_DATA_SOURCE_NAMES.contains(name), "{name}");
        }
    }

    #[test]
    fn test_validate() {
        assert!(validate(ALERT_METHOD_NAMES, "slack", "alert method", "spec.target").is_ok());
        let err = validate(ALERT_METHOD_NAMES, "pager", "alert method", "spec.target").unwrap_err();
        assert!(err.to_string().contains("unsupported alert method name pager, try one of: webhook"));
    }
}
