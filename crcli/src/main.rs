//! crcli - card-range directory front end
//!
//! ```bash
//! crcli --config cardrange.json serve --listen 0.0.0.0:8080
//! crcli --store sqlite --store-path ./data/ranges.db import pres.json
//! crcli --store sqlite --store-path ./data/ranges.db lookup 1234567890123456
//! crcli stats --json
//! ```

mod output;
mod server;

use anyhow::{Context, Result};
use cardrange::{
    pan, AppConfig, CacheMode, DataInitializer, LookupPath, RangeDirectory, StoreMode,
};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "crcli")]
#[command(version, about = "3-D Secure card-range directory")]
struct Cli {
    /// JSON config file
    #[arg(long, short, global = true, env = "CARDRANGE_CONFIG")]
    config: Option<PathBuf>,

    /// Store backend (memory | sqlite), overrides the config file
    #[arg(long, global = true, env = "CARDRANGE_STORE")]
    store: Option<String>,

    /// SQLite catalog file
    #[arg(long, global = true, env = "CARDRANGE_STORE_PATH")]
    store_path: Option<String>,

    /// Cache mode (memory | disabled)
    #[arg(long, global = true, env = "CARDRANGE_CACHE")]
    cache: Option<String>,

    /// Lookup path (store-only | index-first)
    #[arg(long, global = true, env = "CARDRANGE_LOOKUP_PATH")]
    lookup_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080", env = "CARDRANGE_LISTEN")]
        listen: SocketAddr,
    },
    /// Ingest one PRes message from a JSON file
    Import {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Find the range containing a PAN
    Lookup {
        pan: String,
        /// Pad/truncate the PAN to 16 digits instead of parsing it exactly
        #[arg(long)]
        lossy: bool,
        #[arg(long)]
        json: bool,
    },
    /// Store and index statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let dir = Arc::new(RangeDirectory::open(&config).context("failed to open range directory")?);

    DataInitializer::new(&config.data.init, &dir).run();

    if config.lookup.path == LookupPath::IndexFirst {
        match dir.ranges().rebuild_index() {
            Ok(report) => info!(size = report.size, height = report.height, "Index warmed from store"),
            Err(e) => warn!(error = %e, "Index warm-up failed, lookups fall back to cache and store"),
        }
    }

    match cli.command {
        Command::Serve { listen } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(server::run(dir, listen))
        }
        Command::Import { file, json } => {
            let message = cardrange::init::load_pres(&file)?
                .with_context(|| format!("{} not found", file.display()))?;
            let response = dir.ranges().process_pres(&message);
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", output::import_table(&response));
            }
            Ok(())
        }
        Command::Lookup { pan: raw, lossy, json } => {
            let found = if lossy {
                dir.lookups().by_pan_str(&raw)?
            } else {
                let pan = pan::parse_strict(&raw)
                    .with_context(|| format!("PAN must be an integer, got {:?}", raw))?;
                dir.lookups().by_pan(Some(pan))?
            };
            match found {
                Some(range) if json => println!("{}", serde_json::to_string_pretty(&range)?),
                Some(range) => println!("{}", output::range_table(&range)),
                None => {
                    eprintln!("No card range contains {}", raw);
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Command::Stats { json } => {
            let stats = dir.index_stats();
            let stored = dir.ranges().count()?;
            if json {
                let value = serde_json::json!({ "stored": stored, "index": stats });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", output::stats_table(stored, &stats));
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(store) = &cli.store {
        config.store.mode = StoreMode::from_str(store);
    }
    if let Some(path) = &cli.store_path {
        config.store.path = Some(path.clone());
    }
    if let Some(cache) = &cli.cache {
        config.cache.mode = CacheMode::from_str(cache);
    }
    if let Some(path) = &cli.lookup_path {
        config.lookup.path = LookupPath::from_str(path);
    }
    config.validate()?;
    Ok(config)
}
