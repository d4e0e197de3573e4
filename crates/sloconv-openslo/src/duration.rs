//! OpenSLO duration shorthand, e.g. `28d` or `1M`

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static SHORTHAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn shorthand_regex() -> &'static Regex {
    SHORTHAND_REGEX.get_or_init(|| {
        Regex::new(r"^(\d+)([mhdwMQY])$").expect("duration pattern is a valid regex")
    })
}

/// Calendar unit of a duration shorthand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl DurationUnit {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "m" => DurationUnit::Minute,
            "h" => DurationUnit::Hour,
            "d" => DurationUnit::Day,
            "w" => DurationUnit::Week,
            "M" => DurationUnit::Month,
            "Q" => DurationUnit::Quarter,
            "Y" => DurationUnit::Year,
            _ => return None,
        })
    }

    /// Nobl9 time window unit name
    pub fn time_window_unit(&self) -> &'static str {
        match self {
            DurationUnit::Minute => "Minute",
            DurationUnit::Hour => "Hour",
            DurationUnit::Day => "Day",
            DurationUnit::Week => "Week",
            DurationUnit::Month => "Month",
            DurationUnit::Quarter => "Quarter",
            DurationUnit::Year => "Year",
        }
    }
}

/// Parsed `<count><unit>` duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationShorthand {
    pub count: u64,
    pub unit: DurationUnit,
}

/// Reason a duration shorthand was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDurationError {
    input: String,
}

impl fmt::Display for ParseDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid duration shorthand '{}', expected <number><m|h|d|w|M|Q|Y>",
            self.input
        )
    }
}

impl std::error::Error for ParseDurationError {}

impl FromStr for DurationShorthand {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDurationError { input: s.to_string() };
        let captures = shorthand_regex().captures(s).ok_or_else(invalid)?;
        let count = captures[1].parse().map_err(|_| invalid())?;
        let unit = DurationUnit::from_symbol(&captures[2]).ok_or_else(invalid)?;
        Ok(Self { count, unit })
    }
}
