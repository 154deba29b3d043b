//! Renders the `parkbook(1)` man page into `$OUT_DIR/man`.
//!
//! A build script cannot link the crate it builds, so the command outline
//! is restated here. Keep it in step with src/cli.rs.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::path::PathBuf;

const SUBCOMMANDS: &[(&str, &str)] = &[
    ("init", "Create the data directory, the database and the settings record"),
    ("slot", "Add, list, edit, activate, deactivate or remove parking slots"),
    ("settings", "Show or change the booking window length and the turn hours"),
    ("window", "Print the first and last date that can currently be booked"),
    ("reserve", "Book the first itinerant slot, in code order, with room in every turn requested"),
    ("assign", "Book a named slot for a requester, bypassing the booking window"),
    ("cancel", "Cancel a reservation by id, or every turn a requester holds on a day"),
    ("list", "List reservations as a table, JSON, CSV or TSV"),
    ("occupancy", "Show per-slot and per-vehicle usage for a day and time"),
    ("completions", "Print a shell completion script"),
];

fn global_flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .global(true)
        .action(ArgAction::SetTrue)
}

fn global_value(name: &'static str, value: &'static str, env: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name(value)
        .env(env)
        .help(help)
        .global(true)
}

fn outline() -> Command {
    Command::new("parkbook")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Book shared parking slots by day and turn")
        .long_about(
            "Administer a pool of car and motorcycle parking slots and book them \
             for a morning, an afternoon or a full day",
        )
        .arg(global_flag("verbose", "Show debug output, including the slot walk"))
        .arg(global_flag("quiet", "Only print errors"))
        .arg(global_value("data-dir", "PATH", "PARKBOOK_DATA_DIR", "Data directory"))
        .arg(global_value(
            "busy-timeout",
            "SECONDS",
            "PARKBOOK_BUSY_TIMEOUT",
            "How long to wait for another writer",
        ))
        .arg(
            global_flag("disable-autoinit", "Fail instead of creating a missing database")
                .env("PARKBOOK_DISABLE_AUTOINIT"),
        )
        .subcommands(
            SUBCOMMANDS
                .iter()
                .map(|(name, about)| Command::new(*name).about(*about)),
        )
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| std::io::Error::other("OUT_DIR is not set"))?;
    let man_dir = out_dir.join("man");
    std::fs::create_dir_all(&man_dir)?;

    let mut page = Vec::new();
    Man::new(outline()).render(&mut page)?;
    std::fs::write(man_dir.join("parkbook.1"), page)
}
