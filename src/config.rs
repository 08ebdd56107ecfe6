use clap::Parser;
use serde::Deserialize;

use crate::backend::BackendKind;

#[derive(Parser, Debug)]
#[command(name = "stockroom", about = "Stockroom - small product inventory over pluggable backends")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "stockroom.toml")]
    pub config: String,

    /// Backend to start with (overrides config file)
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Sheet file used by the sheet backend (overrides config file)
    #[arg(long)]
    pub sheet_path: Option<String>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Run these statements and exit instead of reading stdin
    #[arg(short, long)]
    pub exec: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_backend")]
    pub backend: BackendConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_kind")]
    pub kind: BackendKind,

    #[serde(default = "default_sheet_path")]
    pub sheet_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_backend() -> BackendConfig {
    BackendConfig {
        kind: default_kind(),
        sheet_path: default_sheet_path(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_kind() -> BackendKind {
    BackendKind::Memory
}

fn default_sheet_path() -> String {
    stockroom_sheet::DEFAULT_SHEET_PATH.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: default_backend(),
            logging: default_logging(),
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(kind) = cli.backend {
            config.backend.kind = kind;
        }
        if let Some(ref path) = cli.sheet_path {
            config.backend.sheet_path = path.clone();
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }

    /// Falls back to defaults when the file does not parse. Runs before
    /// logging is set up, so the warning goes straight to stderr.
    pub fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse config file: {}", e);
            Config::default()
        })
    }
}
