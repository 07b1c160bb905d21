mod config;
mod connection;
mod console;
mod error;
mod events;
mod ingest;
mod scheduling;
mod store;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::MonitorConfig;
use crate::connection::connection_manager::ConnectionManager;
use crate::connection::websocket_transport::WebSocketTransport;
use crate::console::ConsoleDisplay;
use crate::events::MonitorEvent;
use crate::ingest::snapshot_ingestor::SnapshotIngestor;
use crate::scheduling::refresh_scheduler::RefreshScheduler;
use crate::store::snapshot_store::SnapshotStore;
use crate::types::quality::{Quality, QualityTable};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Websocket endpoint; falls back to GARDEN_MONITOR_ENDPOINT, then the public server.
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long, value_enum, default_value = "prismatic")]
    pub alert_quality: Quality,

    #[arg(long, default_value = QualityTable::FILE_NAME)]
    pub qualities: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("garden_monitor=debug".parse()?),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let config = MonitorConfig::new(args.endpoint, args.alert_quality, args.qualities)?;
    let qualities = Arc::new(QualityTable::load(&config.qualities_path)?);
    info!(endpoint = %config.endpoint, items = qualities.len(), alert = %config.alert_quality, "starting garden monitor");

    let store = Arc::new(SnapshotStore::new(config.refresh_interval));
    let (event_sender, _) = broadcast::channel::<MonitorEvent>(1_024);

    let display = ConsoleDisplay::new(Arc::clone(&qualities));
    let display_task = tokio::spawn(display.run(event_sender.subscribe()));

    let ingestor = Arc::new(SnapshotIngestor::new(
        Arc::clone(&store),
        qualities,
        config.alert_quality,
        event_sender.clone(),
    ));

    let mut connection = ConnectionManager::new(
        config.endpoint.as_str(),
        config.reconnect_delay,
        Arc::new(WebSocketTransport),
        ingestor,
        Arc::clone(&store),
        event_sender.clone(),
    );
    connection.start();

    let scheduler = RefreshScheduler::new(
        Arc::clone(&store),
        Arc::new(connection.handle()),
        event_sender.clone(),
    );
    let scheduler_task = tokio::spawn(scheduler.run(config.tick_interval));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutting down");

    connection.stop().await;
    if let Err(error) = scheduler_task.await {
        error!(?error, "refresh scheduler task failed");
    }

    drop(connection);
    drop(event_sender);
    if let Err(error) = display_task.await {
        error!(?error, "display task failed");
    }

    Ok(())
}
