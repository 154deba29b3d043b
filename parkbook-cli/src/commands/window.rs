//! Window command: print the dates currently open for booking.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, today, GlobalOptions};
use chrono::NaiveDate;
use clap::Args;
use parkbook::settings::reader::SettingsReader;

/// Show the range of bookable dates.
#[derive(Args)]
pub struct WindowCommand {
    /// Compute the window as of this date instead of today
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,
}

impl WindowCommand {
    /// Execute the window command.
    ///
    /// Prints `MIN_DATE MAX_DATE`. Unreadable settings fall back to the
    /// configured default window.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let window = SettingsReader::new(&db)
            .booking_window_or_default(self.today.unwrap_or_else(today), config.visible_days());
        println!("{} {}", window.min_date, window.max_date);

        Ok(())
    }
}
