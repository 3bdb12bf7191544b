use clap::{Parser, ValueEnum};
use climate_core::{
    find_config_file, find_data_file, load_config, ConfigSource, DEFAULT_DATABASE_DIR,
    DEFAULT_DATABASE_FILE, DEFAULT_PORT,
};
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

/// Default number of pooled read connections to the dataset
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// When the most active station used by `/api/v1.0/tobs` is determined
#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveStationPolicy {
    /// Computed once while loading the dataset snapshot
    #[default]
    Startup,
    /// Recomputed from the dataset on every request
    PerRequest,
}

#[derive(Parser, Clone, Debug, Deserialize, Default)]
#[command(
    author,
    version,
    about = "Climate API - read-only weather observation queries over a station dataset"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $CLIMATE_API_CONFIG, ./climate.toml,
    /// $XDG_CONFIG_HOME/climate-api/climate.toml, /etc/climate-api/climate.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "CLIMATE_API_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "CLIMATE_API_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CLIMATE_API_PORT")]
    pub port: Option<String>,

    /// Path to the SQLite dataset holding the station and measurement tables
    #[arg(short = 'b', long, env = "CLIMATE_API_DATABASE")]
    #[serde(alias = "database_path")]
    pub database: Option<String>,

    /// When to determine the most active station: startup or per-request
    #[arg(short, long, value_enum, env = "CLIMATE_API_ACTIVE_STATION")]
    pub active_station: Option<ActiveStationPolicy>,

    /// Maximum pooled connections to the dataset
    #[arg(short, long, env = "CLIMATE_API_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
    }

    pub fn database(&self) -> String {
        self.database.clone().unwrap_or_else(|| {
            find_data_file(DEFAULT_DATABASE_DIR, DEFAULT_DATABASE_FILE)
                .display()
                .to_string()
        })
    }

    pub fn active_station(&self) -> ActiveStationPolicy {
        self.active_station.unwrap_or_default()
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
            .filter(|max| *max > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Fill every unset field of `self` from `file_config`
    pub fn merge(self, file_config: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file_config.level),
            domain: self.domain.or(file_config.domain),
            port: self.port.or(file_config.port),
            database: self.database.or(file_config.database),
            active_station: self.active_station.or(file_config.active_station),
            max_connections: self.max_connections.or(file_config.max_connections),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("CLIMATE_API_CONFIG", "climate.toml")
    };

    // The logger is not installed yet, so report on stderr
    if let Some(path) = source.path() {
        eprintln!("Loading config from: {}", path.display());
    }

    let file_config: Cli = match load_config(&source) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring unreadable config {}: {}", source, e);
            Cli::default()
        }
    };

    // CLI args override file config (env vars are handled by clap)
    cli_args.merge(file_config)
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                timestamp,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
