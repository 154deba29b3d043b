//! Init command implementation.
//!
//! This module implements the `init` command for explicitly initializing
//! the parkbook data directory, database and settings record.

use crate::error::CliError;
use crate::utils::{load_configuration, resolve_data_dir, GlobalOptions};
use clap::Args;
use parkbook::config::CONFIG_FILE;
use parkbook::database::DATABASE_FILE;
use parkbook::settings::reader::SettingsReader;
use parkbook::{Database, DatabaseConfig, NewSettings};
use std::fs;
use std::path::PathBuf;

/// Default configuration written by `init --with-config`.
const DEFAULT_CONFIG: &str = "\
# parkbook configuration
#
# default_visible_days: 14
# default_turn_bounds:
#   morning_start: 7
#   morning_end: 12
#   afternoon_start: 13
#   afternoon_end: 18
# capacity:
#   car: 1
#   motorcycle: 4
# verify_after_commit: true
# enforce_booking_window: true
# maximum_lock_wait_seconds: 5
# output_format: table
";

/// Initialize the parkbook data directory and database.
#[derive(Args)]
pub struct InitCommand {
    /// Data directory to initialize
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Overwrite existing database
    #[arg(long)]
    overwrite: bool,

    /// Create default configuration file
    #[arg(long)]
    with_config: bool,

    /// Preview actions without executing
    #[arg(long)]
    dry_run: bool,
}

impl InitCommand {
    /// Execute the init command.
    ///
    /// The --data-dir flag here names where to create, not where to find.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let global = GlobalOptions {
            data_dir: self.data_dir.or_else(|| global.data_dir.clone()),
            ..global.clone()
        };
        let data_dir = resolve_data_dir(&global)?;
        let db_path = data_dir.join(DATABASE_FILE);
        let config_path = data_dir.join(CONFIG_FILE);

        if self.dry_run {
            println!("Dry-run mode: no changes will be made");
            println!();
            println!("Would initialize parkbook in: {}", data_dir.display());
            if data_dir.exists() {
                println!("  - Data directory already exists: {}", data_dir.display());
            } else {
                println!("  - Create data directory: {}", data_dir.display());
            }
            if db_path.exists() && !self.overwrite {
                println!(
                    "  - ERROR: Database already exists (use --overwrite to replace): {}",
                    db_path.display()
                );
            } else {
                println!("  - Create database: {}", db_path.display());
            }
            if self.with_config && !config_path.exists() {
                println!("  - Create configuration file: {}", config_path.display());
            }
            return Ok(());
        }

        if db_path.exists() && !self.overwrite {
            return Err(CliError::InvalidArguments(format!(
                "database already exists (use --overwrite to replace): {}",
                db_path.display()
            )));
        }

        let data_dir_created = !data_dir.exists();
        fs::create_dir_all(&data_dir)?;

        if db_path.exists() {
            fs::remove_file(&db_path)?;
        }

        let config_created = self.with_config && !config_path.exists();
        if config_created {
            fs::write(&config_path, DEFAULT_CONFIG)?;
        }

        let config = load_configuration(&global)?;
        let db = Database::open(DatabaseConfig::new(&db_path))?;
        SettingsReader::new(&db).save(NewSettings {
            visible_days: config.visible_days(),
            turn_bounds: config.turn_bounds(),
        })?;

        println!("Initialized parkbook in: {}", data_dir.display());
        if data_dir_created {
            println!("  - Created data directory");
        }
        if self.overwrite {
            println!("  - Recreated database");
        } else {
            println!("  - Created database");
        }
        println!(
            "  - Booking window {} day(s), turns {}",
            config.visible_days(),
            config.turn_bounds()
        );
        if config_created {
            println!("  - Created default configuration file");
        } else if self.with_config {
            println!("  - Configuration file already exists (not overwritten)");
        }

        Ok(())
    }
}
