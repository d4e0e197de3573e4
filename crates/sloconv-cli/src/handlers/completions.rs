//! Shell completions command handler

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use clap::CommandFactory;
use std::io::Write;

/// Handle the completions command
pub fn handle_completions(args: CompletionsArgs) -> Result<()> {
    write_completions(args, &mut std::io::stdout())
}

fn write_completions(args: CompletionsArgs, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(args.shell.to_clap_shell(), &mut cmd, name, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Shell;

    #[test]
    fn test_bash_completions_list_subcommands() {
        let mut out = Vec::new();
        write_completions(CompletionsArgs { shell: Shell::Bash }, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("sloconv"));
        assert!(script.contains("convert"));
        assert!(script.contains("rules"));
    }
}
