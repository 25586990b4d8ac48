//! price-tracker - Grocery price comparison across Colombian retailers
//!
//! Triggers a live scrape on the price server and shows the best price per product.

use anyhow::Result;
use clap::{Parser, Subcommand};
use price_tracker::commands::retailers::list_retailers;
use price_tracker::commands::SyncCommand;
use price_tracker::config::{Config, OutputFormat};
use price_tracker::view::CategoryFilter;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-tracker",
    version,
    about = "Grocery price comparison across Colombian retailers",
    long_about = "Runs a live search on the price server and shows the cheapest retailer for every product found."
)]
struct Cli {
    /// Price server URL (overrides --origin)
    #[arg(long, global = true, env = "PRICE_TRACKER_BACKEND_URL")]
    backend_url: Option<String>,

    /// Origin the client is served from; loopback origins use the local server
    #[arg(long, global = true, env = "PRICE_TRACKER_ORIGIN")]
    origin: Option<String>,

    /// Request timeout in seconds [env: PRICE_TRACKER_TIMEOUT]
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every retailer and show the best prices
    #[command(alias = "s")]
    Sync {
        /// Brand or product to search for (blank uses the configured default)
        #[arg(default_value = "")]
        query: String,

        /// Only show products in this category ("all" for everything)
        #[arg(long)]
        category: Option<CategoryFilter>,
    },

    /// List tracked retailers
    Retailers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(url) = cli.backend_url {
        config.backend_url = Some(url);
    }
    if let Some(origin) = cli.origin {
        config.origin = Some(origin);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Sync { query, category } => {
            if let Some(category) = category {
                config.category = category;
            }

            let cmd = SyncCommand::new(config);
            let output = cmd.execute(&query).await?;
            println!("{}", output);
        }

        Commands::Retailers => {
            println!("{}", list_retailers(config.format));
        }
    }

    Ok(())
}
