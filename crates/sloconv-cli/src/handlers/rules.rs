//! Rules command handler

use crate::cli::RulesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{OutputWriter, RulesReport};
use sloconv_core::ConversionProfile;
use sloconv_openslo::OpenSloProfile;
use tracing::{debug, instrument};

/// Handle the rules command
#[instrument(skip_all, fields(kind = %args.kind, api_version = %args.api_version))]
pub fn handle_rules(args: RulesArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let report = rules_report(&args, config)?;
    debug!(rules = report.rules.len(), skipped = report.skipped, "Rule table resolved");
    output.rules(&report)
}

fn rules_report(args: &RulesArgs, config: &Config) -> Result<RulesReport> {
    let profile = OpenSloProfile::new(config.conversion.clone());
    let table = profile.rules(&args.api_version, &args.kind)?;
    Ok(RulesReport {
        api_version: args.api_version.clone(),
        kind: args.kind.clone(),
        skipped: table.is_none(),
        rules: table.map(|rules| rules.describe()).unwrap_or_default(),
    })
}
