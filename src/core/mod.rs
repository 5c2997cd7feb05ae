//! Core module - application infrastructure
//!
//! Configuration, logging and the errors they raise. Nothing here knows
//! about chess beyond the types it configures.
//!
//! # Modules
//!
//! - `settings` - [`AppConfig`] (JSON file + CLI flags)
//! - `logging` - `tracing-subscriber` setup
//! - `error` - [`CoreError`]

pub mod error;
pub mod logging;
pub mod settings;

pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use settings::{default_config_path, AppConfig, Cli};
