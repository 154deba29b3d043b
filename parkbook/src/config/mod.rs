//! Engine policy that is not kept in the database.
//!
//! Slot capacities, write verification, booking window enforcement, and
//! the settings used when the database has no settings record all come
//! from here. Later layers win:
//!
//! 1. built-in defaults
//! 2. `config.yaml` in the data directory
//! 3. `PARKBOOK_*` environment variables
//! 4. a [`Config`] passed to [`ConfigBuilder::with_config`]
//!
//! ```
//! use parkbook::config::{CapacityConfig, Config, ConfigBuilder};
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_config(Config {
//!         capacity: Some(CapacityConfig { car: None, motorcycle: Some(3) }),
//!         verify_after_commit: Some(false),
//!         ..Default::default()
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.capacities().car, 1);
//! assert_eq!(config.capacities().motorcycle, 3);
//! assert!(!config.verify_after_commit());
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource, CONFIG_FILE};
pub use merger::ConfigMerger;
pub use schema::{CapacityConfig, Config, OutputFormat, DEFAULT_VISIBLE_DAYS};
pub use validator::{ConfigValidator, MAX_SLOT_CAPACITY};
