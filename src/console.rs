use std::sync::Arc;

use chrono::{DateTime, Utc};

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::events::{MonitorEvent, format_remaining};
use crate::types::{price::Price, quality::Quality, quality::QualityTable, snapshot::Snapshot};

/// One line of the inventory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub category: String,
    pub name: String,
    pub quality: Option<Quality>,
    pub price: Price,
    pub stock: i64,
    pub last_updated: Option<DateTime<Utc>>,
    pub low_stock: bool,
}

/// Log-based stand-in for a visual display: drains monitor events and prints them.
pub struct ConsoleDisplay {
    qualities: Arc<QualityTable>,
}

impl ConsoleDisplay {
    pub fn new(qualities: Arc<QualityTable>) -> Self {
        Self { qualities }
    }

    pub fn rows(&self, snapshot: &Snapshot) -> Vec<InventoryRow> {
        snapshot
            .iter()
            .map(|item| InventoryRow {
                category: item.category().to_string(),
                name: item.display_name().to_string(),
                quality: item.name().and_then(|name| self.qualities.quality_of(name)),
                price: item.price(),
                stock: item.stock(),
                last_updated: item.last_updated(),
                low_stock: item.is_low_stock(),
            })
            .collect()
    }

    pub async fn run(self, mut events: broadcast::Receiver<MonitorEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.show(&event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged = n, "display lagged; dropped events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn show(&self, event: &MonitorEvent) {
        match event {
            MonitorEvent::SnapshotChanged(snapshot) if snapshot.is_empty() => {
                info!("refreshing data...");
            }
            MonitorEvent::SnapshotChanged(snapshot) => {
                for row in self.rows(snapshot) {
                    let quality = row.quality.map(|quality| quality.to_string());
                    info!(
                        category = %row.category,
                        item = %row.name,
                        quality = quality.as_deref().unwrap_or("-"),
                        price = %row.price,
                        stock = row.stock,
                        low_stock = row.low_stock,
                        last_updated = ?row.last_updated,
                        "inventory"
                    );
                }
            }
            MonitorEvent::ScheduleTick { remaining } => {
                tracing::trace!("next update in {}", format_remaining(*remaining));
            }
            MonitorEvent::Alert { item, quality } => {
                info!("✨ {quality} in stock: {}", item.display_name());
            }
            MonitorEvent::ConnectionStateChanged(state) => {
                info!(%state, "{}", state.status_label());
            }
        }
    }
}
