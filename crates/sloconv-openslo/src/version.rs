//! Schema versions and object kinds on both sides of the conversion

use serde::{Deserialize, Serialize};
use sloconv_core::Error;
use std::fmt;
use std::str::FromStr;

/// `apiVersion` written on every converted object
pub const NOBL9_API_VERSION: &str = "n9/v1alpha";

/// Supported OpenSLO schema versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    #[serde(rename = "openslo/v1")]
    V1,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "openslo/v1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openslo/v1" => Ok(ApiVersion::V1),
            other => Err(Error::UnsupportedVersion {
                version: other.to_string(),
            }),
        }
    }
}

/// OpenSLO object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "SLO")]
    Slo,
    #[serde(rename = "SLI")]
    Sli,
    Service,
    DataSource,
    AlertPolicy,
    AlertCondition,
    AlertNotificationTarget,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::Service,
        Kind::Slo,
        Kind::Sli,
        Kind::DataSource,
        Kind::AlertPolicy,
        Kind::AlertCondition,
        Kind::AlertNotificationTarget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Slo => "SLO",
            Kind::Sli => "SLI",
            Kind::Service => "Service",
            Kind::DataSource => "DataSource",
            Kind::AlertPolicy => "AlertPolicy",
            Kind::AlertCondition => "AlertCondition",
            Kind::AlertNotificationTarget => "AlertNotificationTarget",
        }
    }

    /// Parse a kind within `version`
    pub fn parse(version: ApiVersion, s: &str) -> Result<Self, Error> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnsupportedKind {
                version: version.to_string(),
                kind: s.to_string(),
            })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nobl9 object kinds produced by the conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nobl9Kind {
    Agent,
    Direct,
    AlertMethod,
}

impl Nobl9Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nobl9Kind::Agent => "Agent",
            Nobl9Kind::Direct => "Direct",
            Nobl9Kind::AlertMethod => "AlertMethod",
        }
    }
}

impl fmt::Display for Nobl9Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
