//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::shop::retry::RetryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default listing to scrape.
pub const DEFAULT_BASE_URL: &str = "https://dentalstall.com/shop/";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listing URL; pages are requested as `<base_url>?page=N`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Proxy URL applied to every request of a run (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Number of pages to scrape; a run refuses to start without one
    #[serde(default)]
    pub page_limit: Option<u32>,

    /// Base delay between requests in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Page fetch retry policy
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Currency markers stripped before parsing prices
    #[serde(default = "default_currency_symbols")]
    pub currency_symbols: Vec<String>,

    /// Directory downloaded product images are written to
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// JSON file overwritten with every run's records
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// SQLite database holding stored products
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// JSON file backing the record cache
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Static token a caller must present to trigger a run
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_currency_symbols() -> Vec<String> {
    vec!["₹".to_string()]
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("scraped_data.json")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("scraped_data.db")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("scrape_cache.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy: None,
            page_limit: None,
            delay_ms: 0,
            delay_jitter_ms: 0,
            retry: RetryPolicy::default(),
            currency_symbols: default_currency_symbols(),
            images_dir: default_images_dir(),
            snapshot_path: default_snapshot_path(),
            database_path: default_database_path(),
            cache_path: default_cache_path(),
            auth_token: None,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("stall-scraper").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("STALL_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.base_url = base_url;
            }
        }

        if let Ok(proxy) = std::env::var("STALL_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(limit) = std::env::var("STALL_PAGE_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.page_limit = Some(l);
            }
        }

        if let Ok(token) = std::env::var("STALL_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }

        if let Ok(delay) = std::env::var("STALL_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
