//! `parkbook`: administer shared parking slots and book them by turn.

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    parkbook::init_logger(cli.verbose, cli.quiet).install();

    let (global, command) = cli.into_parts();
    if let Err(err) = command.execute(&global) {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
