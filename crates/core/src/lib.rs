//! Climate API Core Library
//!
//! Shared utilities for the climate API server:
//! - Configuration loading (XDG-compliant)
//! - Dataset file discovery
//! - Application constants

mod config;
pub mod fs;

pub use config::{find_config_file, find_data_file, get_xdg_data_dir, load_config, ConfigSource};
pub use fs::is_file;

/// Application name used for XDG paths
pub const APP_NAME: &str = "climate-api";

/// Default port to listen on
pub const DEFAULT_PORT: u16 = 5000;

/// Default dataset file name
pub const DEFAULT_DATABASE_FILE: &str = "hawaii.sqlite";

/// Directory the dataset is expected in when run from a checkout
pub const DEFAULT_DATABASE_DIR: &str = "./Resources";

/// Length of the trailing observation window, in days
pub const WINDOW_DAYS: i64 = 365;
