//! Command handlers for CLI subcommands

mod completions;
mod config;
mod convert;
mod rules;

pub use completions::handle_completions;
pub use config::handle_config;
pub use convert::handle_convert;
pub use rules::handle_rules;
