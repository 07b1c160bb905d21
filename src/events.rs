use std::time::Duration;

use tokio::sync::broadcast;

use crate::types::{
    connection_state::ConnectionState, inventory_item::InventoryItem, quality::Quality,
    snapshot::Snapshot,
};

pub type EventSender = broadcast::Sender<MonitorEvent>;

#[derive(Debug, Clone)]
pub enum MonitorEvent {
    SnapshotChanged(Snapshot),
    ScheduleTick {
        remaining: Duration,
    },
    Alert {
        item: InventoryItem,
        quality: Quality,
    },
    ConnectionStateChanged(ConnectionState),
}

/// Formats a countdown as `MM:SS`, minutes are not wrapped into hours.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
