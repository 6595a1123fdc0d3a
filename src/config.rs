//! Command line flags and the resolved runtime configuration
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use crate::error::ConfigError;
use crate::state::favorites::DEFAULT_MAX_FAVORITES;

/// Public Rick and Morty GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://rickandmortyapi.com/graphql";

const APP_DIR: &str = "roster";
const DB_FILE: &str = "roster.db";

#[derive(Parser, Debug, Clone)]
#[command(name = "roster", version, about = "Browse the character roster and keep a few favorites")]
pub struct Args {
    /// GraphQL endpoint serving the `characters` query
    #[arg(long, env = "ROSTER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Directory holding the favorites database
    #[arg(long, env = "ROSTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for cached avatars
    #[arg(long, env = "ROSTER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// How many favorites are kept before the oldest is dropped
    #[arg(long, default_value_t = DEFAULT_MAX_FAVORITES, value_parser = parse_capacity)]
    pub max_favorites: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Do not download character avatars
    #[arg(long)]
    pub no_avatars: bool,

    /// trace, debug, info, warn or error
    #[arg(long, env = "ROSTER_LOG", default_value = "info")]
    pub log_level: String,
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Args {
    pub fn log_level(&self) -> Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Settings the application runs with
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    /// SQLite file holding the favorites snapshot
    pub db_path: PathBuf,
    /// `None` when avatars are disabled
    pub avatars: Option<AvatarConfig>,
    pub max_favorites: usize,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AvatarConfig {
    /// `None` when no cache directory could be determined
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let data_dir = match &args.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .or_else(dirs::home_dir)
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let avatars = (!args.no_avatars).then(|| AvatarConfig {
            cache_dir: args
                .cache_dir
                .clone()
                .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR)))
                .map(|dir| dir.join("avatars")),
        });

        Ok(Self {
            endpoint: args.endpoint.clone(),
            db_path: data_dir.join(DB_FILE),
            avatars,
            max_favorites: args.max_favorites,
            request_timeout: Duration::from_secs(args.timeout_secs),
        })
    }
}
