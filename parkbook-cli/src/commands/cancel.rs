//! Cancel command implementation.
//!
//! Cancels one reservation by id, or every turn a requester holds on a date.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, GlobalOptions};
use chrono::NaiveDate;
use clap::Args;
use parkbook::{AllocationEngine, AllocationPolicy, ReservationId};

/// Cancel reservations.
#[derive(Args)]
pub struct CancelCommand {
    /// Reservation id to cancel
    #[arg(value_name = "ID", conflicts_with_all = ["email", "date"], required_unless_present = "email")]
    pub id: Option<i64>,

    /// Cancel every turn this requester holds on --date
    #[arg(long, value_name = "EMAIL", requires = "date")]
    pub email: Option<String>,

    /// Day whose bookings to cancel
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,
}

impl CancelCommand {
    /// Execute the cancel command.
    ///
    /// Cancelling an already-cancelled reservation succeeds without change.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let engine = AllocationEngine::new(&db, AllocationPolicy::from_config(&config));

        let cancelled = match (self.id, self.email, self.date) {
            (Some(id), _, _) => vec![engine.cancel(ReservationId::new(id))?],
            (None, Some(email), Some(date)) => engine.cancel_full_day(&email, date)?,
            _ => {
                return Err(CliError::InvalidArguments(
                    "give a reservation id, or --email with --date".to_string(),
                ))
            }
        };

        if !global.quiet {
            if cancelled.is_empty() {
                println!("Nothing to cancel");
            }
            for reservation in &cancelled {
                println!(
                    "Cancelled reservation {} ({} {})",
                    reservation.id, reservation.date, reservation.turn
                );
            }
        }

        Ok(())
    }
}
