use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_API_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const APP_DIR: &str = "world-explorer";

/// Browse, search and bookmark the countries of the world.
#[derive(Debug, Parser)]
#[command(name = "world-explorer", version, about)]
pub struct Cli {
    /// Base URL of the REST Countries v3.1 API.
    #[arg(long, env = "WORLD_EXPLORER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// HTTP timeout in seconds.
    #[arg(long, env = "WORLD_EXPLORER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Where per-user favorites are stored.
    #[arg(long, env = "WORLD_EXPLORER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Where log files are written.
    #[arg(long, env = "WORLD_EXPLORER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Sign in as this user on start-up.
    #[arg(long, env = "WORLD_EXPLORER_USER")]
    pub user: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_dir: data_dir.join("logs"),
            data_dir,
            user: None,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
        let log_dir = cli.log_dir.unwrap_or_else(|| data_dir.join("logs"));
        Self {
            api_url: cli.api_url,
            timeout_secs: cli.timeout_secs,
            data_dir,
            log_dir,
            user: cli.user.filter(|user| !user.trim().is_empty()),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Cli::parse().into()
    }
}

/// `<platform data dir>/world-explorer`, or a dot directory in the working
/// directory when the platform has none.
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
}
