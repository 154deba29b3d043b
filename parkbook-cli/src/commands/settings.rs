//! Settings commands: show or change the booking window and turn bounds.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, output_format, write_records, GlobalOptions};
use clap::{Args, Subcommand};
use parkbook::config::OutputFormat;
use parkbook::settings::reader::SettingsReader;
use parkbook::{NewSettings, Turn, TurnBounds};

/// Column headers for the settings record.
const COLUMN_HEADERS: [&str; 3] = ["visible_days", "morning", "afternoon"];

/// Show or change booking settings.
#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub action: SettingsAction,
}

/// Settings subcommands.
#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the stored settings
    Show {
        /// Output format
        #[arg(long, value_enum, ignore_case = true)]
        format: Option<OutputFormat>,
    },

    /// Change the stored settings
    Set {
        /// Days ahead of today that may be booked
        #[arg(long, value_name = "DAYS")]
        visible_days: Option<u32>,

        /// Turn hours as MORNING_START-MORNING_END,AFTERNOON_START-AFTERNOON_END
        #[arg(long, value_name = "HOURS")]
        turn_bounds: Option<TurnBounds>,
    },
}

impl SettingsCommand {
    /// Execute the settings command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let reader = SettingsReader::new(&db);

        match self.action {
            SettingsAction::Show { format } => {
                let settings = reader.load()?;
                let row = vec![
                    settings.visible_days.to_string(),
                    settings.turn_bounds.describe(Turn::Morning),
                    settings.turn_bounds.describe(Turn::Afternoon),
                ];
                write_records(
                    output_format(format, &config),
                    &COLUMN_HEADERS,
                    &[row],
                    &settings,
                )?;
            }
            SettingsAction::Set {
                visible_days,
                turn_bounds,
            } => {
                if visible_days.is_none() && turn_bounds.is_none() {
                    return Err(CliError::InvalidArguments(
                        "nothing to change (use --visible-days or --turn-bounds)".to_string(),
                    ));
                }
                let current = reader.find()?;
                let values = NewSettings {
                    visible_days: visible_days
                        .or(current.as_ref().map(|s| s.visible_days))
                        .unwrap_or_else(|| config.visible_days()),
                    turn_bounds: turn_bounds
                        .or(current.as_ref().map(|s| s.turn_bounds))
                        .unwrap_or_else(|| config.turn_bounds()),
                };
                let saved = reader.save(values)?;
                if !global.quiet {
                    println!(
                        "Booking window {} day(s); morning {}, afternoon {}",
                        saved.visible_days,
                        saved.turn_bounds.describe(Turn::Morning),
                        saved.turn_bounds.describe(Turn::Afternoon)
                    );
                }
            }
        }

        Ok(())
    }
}
