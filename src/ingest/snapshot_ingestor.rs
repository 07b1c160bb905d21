use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::ParseError;
use crate::events::{EventSender, MonitorEvent};
use crate::ingest::payload::{Envelope, ItemRecord, parse_timestamp};
use crate::store::snapshot_store::SnapshotStore;
use crate::types::{
    inventory_item::InventoryItem, price::Price, quality::Quality, quality::QualityTable,
    snapshot::Snapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The message carried no inventory.
    Ignored,
    Replaced {
        items: usize,
        last_update_time: Option<DateTime<Utc>>,
    },
}

pub struct SnapshotIngestor {
    store: Arc<SnapshotStore>,
    qualities: Arc<QualityTable>,
    alert_quality: Quality,
    events: EventSender,
}

impl SnapshotIngestor {
    pub fn new(
        store: Arc<SnapshotStore>,
        qualities: Arc<QualityTable>,
        alert_quality: Quality,
        events: EventSender,
    ) -> Self {
        Self {
            store,
            qualities,
            alert_quality,
            events,
        }
    }

    pub fn ingest(&self, raw: &str) -> Result<IngestOutcome, ParseError> {
        let Some(data) = Envelope::parse(raw)?.data else {
            debug!("ignoring message without inventory data");
            return Ok(IngestOutcome::Ignored);
        };

        let (snapshot, last_update_time) = parse_snapshot(data)?;
        let items = snapshot.len();

        self.store.replace(snapshot.clone(), last_update_time);
        info!(items, ?last_update_time, "inventory snapshot replaced");

        let alert = self.find_alert(&snapshot);
        let _ = self.events.send(MonitorEvent::SnapshotChanged(snapshot));

        if let Some((item, quality)) = alert {
            info!(item = item.display_name(), %quality, "alert-worthy item in stock");
            let _ = self.events.send(MonitorEvent::Alert { item, quality });
        }

        Ok(IngestOutcome::Replaced {
            items,
            last_update_time,
        })
    }

    fn find_alert(&self, snapshot: &Snapshot) -> Option<(InventoryItem, Quality)> {
        snapshot.iter().find_map(|item| {
            let quality = self.qualities.quality_of(item.name()?)?;
            (quality == self.alert_quality).then(|| (item.clone(), quality))
        })
    }
}

/// Builds the snapshot and the latest item timestamp. Any bad record fails the whole payload.
fn parse_snapshot(
    data: Map<String, Value>,
) -> Result<(Snapshot, Option<DateTime<Utc>>), ParseError> {
    let mut items = Vec::new();
    let mut latest: Option<DateTime<Utc>> = None;

    for (category, records) in data {
        let Value::Array(records) = records else {
            debug!(%category, "skipping category that is not a list");
            continue;
        };

        let category_name = category.to_uppercase();

        for record in records {
            let record: ItemRecord =
                serde_json::from_value(record).map_err(|source| ParseError::Record {
                    category: category.clone(),
                    source,
                })?;

            let last_updated = record
                .last_updated
                .as_deref()
                .map(parse_timestamp)
                .transpose()?;

            if let Some(timestamp) = last_updated {
                latest = Some(latest.map_or(timestamp, |current| current.max(timestamp)));
            }

            items.push(InventoryItem::new(
                category_name.clone(),
                record.name,
                Price::from(record.price),
                record.quantity.unwrap_or(0),
                last_updated,
            ));
        }
    }

    Ok((Snapshot::new(items), latest))
}
