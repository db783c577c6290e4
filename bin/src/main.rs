//! candela CLI - Realtime exchange ticks aggregated into OHLCV candles.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;
mod settings;

use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "candela")]
#[command(about = "Realtime exchange ticks aggregated into OHLCV candles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (TOML, YAML or JSON). Defaults to ./candela.* if present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Candle database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to the ticker feed and aggregate candles until Ctrl-C
    Ingest {
        /// Instrument product code (e.g., BTC_JPY)
        #[arg(short, long)]
        product_code: Option<String>,

        /// Bucket durations, comma separated (e.g., 1s,1m,1h)
        #[arg(short, long, value_delimiter = ',')]
        durations: Option<Vec<String>>,

        /// Duration whose new buckets reach the decision hook
        #[arg(long)]
        decision: Option<String>,

        /// Websocket endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Print the most recent candles as JSON
    Candles {
        /// Instrument product code. Defaults to the configured one
        #[arg(short, long)]
        product_code: Option<String>,

        /// Bucket duration (e.g., 1m)
        #[arg(short, long, default_value = "1m")]
        duration: String,

        /// Maximum candles to return (1-1000; anything else means 1000)
        #[arg(short, long)]
        limit: Option<String>,
    },

    /// List the configured bucket durations
    Durations,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            db_path: self.db.clone(),
            log_file: self.log_file.clone(),
            ..Overrides::default()
        };
        if let Some(Commands::Ingest {
            product_code,
            durations,
            decision,
            endpoint,
        }) = &self.command
        {
            overrides.product_code.clone_from(product_code);
            overrides.durations.clone_from(durations);
            overrides.decision_duration.clone_from(decision);
            overrides.endpoint.clone_from(endpoint);
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    if cli.command.is_none() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())?;
    logging::setup_logging(cli.verbose, settings.log_file.as_deref())?;

    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Ingest { .. } => commands::ingest::ingest(&settings).await,
        Commands::Candles {
            product_code,
            duration,
            limit,
        } => commands::candles::candles(&settings, product_code.as_deref(), &duration, limit.as_deref()),
        Commands::Durations => commands::durations::list_durations(&settings),
    }
}
