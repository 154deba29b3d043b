//! The clap tree: global switches and one subcommand per operation.

use crate::commands::{
    AssignCommand, CancelCommand, CompletionsCommand, InitCommand, ListCommand, OccupancyCommand,
    ReserveCommand, SettingsCommand, SlotCommand, WindowCommand,
};
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for booking shared parking slots.
#[derive(Parser)]
#[command(name = "parkbook")]
#[command(version, about = "Book shared parking slots by day and turn", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "PARKBOOK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "PARKBOOK_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    /// Disable automatic database initialization
    #[arg(long, global = true, env = "PARKBOOK_DISABLE_AUTOINIT")]
    pub disable_autoinit: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the data directory and database
    Init(InitCommand),

    /// Manage parking slots
    Slot(SlotCommand),

    /// Show or change booking settings
    Settings(SettingsCommand),

    /// Show the dates open for booking
    Window(WindowCommand),

    /// Book the first free slot for a vehicle type and turn
    Reserve(ReserveCommand),

    /// Book a specific slot
    Assign(AssignCommand),

    /// Cancel reservations
    Cancel(CancelCommand),

    /// List reservations
    List(ListCommand),

    /// Show slot occupancy for a day
    Occupancy(OccupancyCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}

impl Cli {
    /// Splits the parsed line into the switches every command sees and the
    /// command itself.
    #[must_use]
    pub fn into_parts(self) -> (GlobalOptions, Command) {
        let global = GlobalOptions {
            verbose: self.verbose,
            quiet: self.quiet,
            data_dir: self.data_dir,
            busy_timeout: self.busy_timeout,
            disable_autoinit: self.disable_autoinit,
        };
        (global, self.command)
    }
}

impl Command {
    /// Runs the selected subcommand.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        match self {
            Self::Init(cmd) => cmd.execute(global),
            Self::Slot(cmd) => cmd.execute(global),
            Self::Settings(cmd) => cmd.execute(global),
            Self::Window(cmd) => cmd.execute(global),
            Self::Reserve(cmd) => cmd.execute(global),
            Self::Assign(cmd) => cmd.execute(global),
            Self::Cancel(cmd) => cmd.execute(global),
            Self::List(cmd) => cmd.execute(global),
            Self::Occupancy(cmd) => cmd.execute(global),
            Self::Completions(cmd) => cmd.execute(global),
        }
    }
}
