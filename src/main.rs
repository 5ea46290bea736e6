//! stall-scraper - product listing scraper with cache-then-store reconciliation

use anyhow::Result;
use clap::{Parser, Subcommand};
use stall_scraper::commands::{ListCommand, RunCommand};
use stall_scraper::config::{Config, OutputFormat};
use stall_scraper::format::Formatter;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stall-scraper",
    version,
    about = "Scrape shop listings into a local product store",
    long_about = "Walks a WooCommerce product listing page by page, saves product images, and keeps a SQLite store of titles and prices up to date."
)]
struct Cli {
    /// Proxy URL used for every request of the run (e.g., socks5://host:port)
    #[arg(long, global = true, env = "STALL_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "STALL_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape listing pages and reconcile them into the store
    #[command(alias = "r")]
    Run {
        /// Number of listing pages to scrape, starting at page 1
        #[arg(short, long)]
        pages: Option<u32>,

        /// Access token, required when one is configured
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Show the products in the store
    #[command(alias = "ls")]
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.format = cli.format;
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }

    match cli.command {
        Commands::Run { pages, token } => {
            let format = config.format;
            let cmd = RunCommand::new(config);
            let report = cmd.execute(pages, cli.proxy, token.as_deref()).await?;
            println!("{}", Formatter::new(format).format_report(&report));
        }

        Commands::List => {
            let output = ListCommand::new(config).execute()?;
            println!("{}", output);
        }
    }

    Ok(())
}
