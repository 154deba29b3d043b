//! Reserve command implementation.
//!
//! This module implements the `reserve` command, which books the first
//! itinerant slot with room for the requested turn.

use crate::error::CliError;
use crate::utils::{load_configuration, now, open_database, output_format, today, GlobalOptions};
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use parkbook::config::OutputFormat;
use parkbook::settings::reader::SettingsReader;
use parkbook::store::DataStore;
use parkbook::{
    Allocation, AllocationEngine, AllocationPolicy, AllocationRequest, Config, Turn, VehicleType,
};

/// Who is booking, for which day and turn.
#[derive(Args, Clone)]
pub struct RequestArgs {
    /// Turn to book (defaults to the turn in progress, or the next one)
    #[arg(long, value_enum, ignore_case = true)]
    pub turn: Option<Turn>,

    /// Day to book (defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Requester e-mail
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    /// Requester display name (defaults to the e-mail)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Evaluate the booking window as of this date instead of today
    #[arg(long, value_name = "DATE", hide = true)]
    pub today: Option<NaiveDate>,

    /// Pick the default turn as of this time of day instead of now
    #[arg(long, value_name = "TIME", hide = true)]
    pub now: Option<NaiveTime>,
}

impl RequestArgs {
    /// Builds the allocation request for `vehicle_type`.
    ///
    /// Without `--turn` the stored turn bounds (or the configured ones when
    /// no settings record is readable) pick the turn for the current time.
    pub fn request<S: DataStore + ?Sized>(
        &self,
        vehicle_type: VehicleType,
        store: &S,
        config: &Config,
    ) -> Result<AllocationRequest, CliError> {
        let today = self.today.unwrap_or_else(today);
        let turn = self.turn.unwrap_or_else(|| {
            SettingsReader::new(store)
                .turn_bounds_or_default(config.turn_bounds())
                .default_turn(self.now.unwrap_or_else(now))
        });
        let name = self.name.as_deref().unwrap_or(&self.email);
        Ok(AllocationRequest::new(
            vehicle_type,
            turn,
            self.date.unwrap_or(today),
            &self.email,
            name,
        )?)
    }

    /// The date the booking window is anchored on.
    pub fn anchor(&self) -> NaiveDate {
        self.today.unwrap_or_else(today)
    }
}

/// Book a parking slot.
#[derive(Args)]
pub struct ReserveCommand {
    /// Vehicle type
    #[arg(long = "vehicle", value_enum, ignore_case = true)]
    pub vehicle_type: VehicleType,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Output format (json prints the created rows)
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,
}

impl ReserveCommand {
    /// Execute the reserve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let request = self.request.request(self.vehicle_type, &db, &config)?;
        let engine = AllocationEngine::new(&db, AllocationPolicy::from_config(&config));
        let allocation = engine.allocate(&request, self.request.anchor())?;

        print_allocation(&allocation, output_format(self.format, &config), global)
    }
}

/// Print a confirmed allocation: JSON, or the confirmation message.
pub fn print_allocation(
    allocation: &Allocation,
    format: OutputFormat,
    global: &GlobalOptions,
) -> Result<(), CliError> {
    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(allocation)
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
        println!("{json}");
    } else if !global.quiet {
        println!("{}", allocation.message);
    } else {
        println!("{}", allocation.slot_code);
    }
    Ok(())
}
