//! parkwatch Aggregator Binary
//!
//! Starts the UDP server for the `/parking` resource.

use std::sync::Arc;

use clap::Parser;
use parkwatch::aggregator::{Endpoint, ResourceHandler, Server};
use parkwatch::config::EventSyncStrategy;
use parkwatch::eventlog::EventLog;
use parkwatch::{Config, SlotStore};
use tracing_subscriber::{fmt, EnvFilter};

/// parkwatch Aggregator
#[derive(Parser, Debug)]
#[command(name = "parkwatch-aggregator")]
#[command(about = "Parking occupancy aggregator")]
#[command(version)]
struct Args {
    /// Data directory (holds events.log)
    #[arg(short, long, default_value = "./parkwatch_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:5683")]
    listen: String,

    /// Registered slot identifiers
    #[arg(short, long, value_delimiter = ',', default_value = "slot1,slot2,slot3,slot4")]
    slots: Vec<String>,

    /// Worker threads handling requests
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// fsync the event log every N records instead of every record
    #[arg(long)]
    sync_every: Option<usize>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,parkwatch=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("parkwatch aggregator v{}", parkwatch::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = match args.sync_every {
        Some(count) if count > 1 => EventSyncStrategy::EveryNEntries { count },
        _ => EventSyncStrategy::EveryWrite,
    };

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .slots(args.slots)
        .worker_threads(args.workers)
        .event_sync_strategy(sync_strategy)
        .build();

    // Open event log
    let event_log = match EventLog::open_in(&config.data_dir, config.event_sync_strategy) {
        Ok(log) => Arc::new(log),
        Err(e) => {
            tracing::error!("Failed to open event log: {}", e);
            std::process::exit(1);
        }
    };

    for (slot, stats) in event_log.all_stats() {
        tracing::info!("{}: {} cars recorded so far", slot, stats.total_cars);
    }

    let store = Arc::new(SlotStore::new(config.slots.clone(), event_log));
    tracing::info!("Registered slots: {}", store.slot_ids().join(", "));

    let endpoint = Arc::new(Endpoint::new(ResourceHandler::new(store)));

    // Start server
    let server = match Server::bind(config, endpoint) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
