//! `parkbook completions`: print a shell completion script to stdout.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

/// Print a completion script for the given shell
#[derive(Args)]
pub struct CompletionsCommand {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Where each shell conventionally picks the script up from.
fn install_hint(shell: Shell) -> Option<&'static str> {
    match shell {
        Shell::Bash => Some("~/.local/share/bash-completion/completions/parkbook"),
        Shell::Zsh => Some("a directory on $fpath, as _parkbook"),
        Shell::Fish => Some("~/.config/fish/completions/parkbook.fish"),
        Shell::PowerShell => Some("your $PROFILE"),
        _ => None,
    }
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        if !global.quiet {
            if let Some(hint) = install_hint(self.shell) {
                eprintln!("# save the {} script below to {hint}", self.shell);
            }
        }

        let mut command = Cli::command();
        let name = command.get_name().to_string();
        generate(self.shell, &mut command, name, &mut std::io::stdout().lock());
        Ok(())
    }
}
