use crate::listener::{
    ListenerConfig, DEFAULT_CHANNEL, DEFAULT_KEEPALIVE, DEFAULT_MAX_RECONNECT,
    DEFAULT_MIN_RECONNECT,
};
use crate::muted_error;
use anyhow::{bail, Context};
use clap::Parser;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4711;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// PostgreSQL connection string of the database executing pages
    #[clap(env = "POGO_DBG_DATABASE_URL")]
    pub database_url: Option<String>,

    /// HTTP port, the server listens on localhost (default: 4711)
    #[clap(short, long, env = "POGO_DBG_PORT")]
    pub port: Option<u16>,

    /// Path to a configuration file (default: ~/.config/pogo-dbg/config.toml)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Install verified breakpoints into the database after each update
    #[clap(long)]
    pub install_breakpoints: bool,

    /// Log filter, overrides RUST_LOG (e.g. "debug" or "pogo_debugger=trace")
    #[clap(long)]
    pub log_level: Option<String>,
}

/// Content of a configuration file, every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub port: Option<u16>,
    pub channel: Option<String>,
    pub keepalive_secs: Option<u64>,
    pub min_reconnect_secs: Option<u64>,
    pub max_reconnect_secs: Option<u64>,
    pub install_breakpoints: Option<bool>,
}

impl FileConfig {
    const DEFAULT_PATH: &'static str = ".config/pogo-dbg/config.toml";

    pub fn parse(data: &str) -> anyhow::Result<Self> {
        Ok(toml::de::from_str(data)?)
    }

    /// Load configuration file. A missing file at the default location is not an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let data = match path {
            None => {
                let Some(home) = home::home_dir() else {
                    return Ok(Self::default());
                };
                match muted_error!(read_to_string(home.join(Self::DEFAULT_PATH))) {
                    Some(data) => data,
                    None => return Ok(Self::default()),
                }
            }
            Some(path) => read_to_string(path)
                .with_context(|| format!("read config file {}", path.display()))?,
        };
        Self::parse(&data)
    }
}

/// Debugger server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub install_breakpoints: bool,
    pub listener: ListenerConfig,
}

impl Config {
    /// Merge command line arguments over a configuration file.
    pub fn merge(args: &Args, file: FileConfig) -> anyhow::Result<Self> {
        let Some(database_url) = args.database_url.clone().or(file.database_url) else {
            bail!("database connection string is not set");
        };

        let channel = file.channel.unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
        if channel.is_empty() || !channel.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("invalid notification channel name `{channel}`");
        }

        let secs = |value: Option<u64>, default: Duration| {
            value.map(Duration::from_secs).unwrap_or(default)
        };

        Ok(Self {
            database_url,
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            install_breakpoints: args.install_breakpoints
                || file.install_breakpoints.unwrap_or_default(),
            listener: ListenerConfig {
                channel,
                keepalive: secs(file.keepalive_secs, DEFAULT_KEEPALIVE),
                min_reconnect: secs(file.min_reconnect_secs, DEFAULT_MIN_RECONNECT),
                max_reconnect: secs(file.max_reconnect_secs, DEFAULT_MAX_RECONNECT),
            },
        })
    }

    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let file = FileConfig::load(args.config.as_deref())?;
        Self::merge(args, file)
    }
}
