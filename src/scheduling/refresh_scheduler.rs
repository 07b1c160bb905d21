use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::events::{EventSender, MonitorEvent, format_remaining};
use crate::scheduling::types::TickOutcome;
use crate::store::snapshot_store::{RefreshCheck, SnapshotStore};
use crate::types::snapshot::Snapshot;

pub trait RefreshTrigger: Send + Sync {
    /// Asks for fresh data. Returns `false` when the request was dropped.
    fn request_refresh(&self) -> bool;
    fn is_shut_down(&self) -> bool;
}

/// Decides once per tick whether the next server restock is due.
pub struct RefreshScheduler {
    store: Arc<SnapshotStore>,
    trigger: Arc<dyn RefreshTrigger>,
    events: EventSender,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<SnapshotStore>,
        trigger: Arc<dyn RefreshTrigger>,
        events: EventSender,
    ) -> Self {
        Self {
            store,
            trigger,
            events,
        }
    }

    pub fn tick(&self, now: DateTime<Utc>) -> TickOutcome {
        if self.trigger.is_shut_down() {
            return TickOutcome::Stopped;
        }

        match self.store.begin_refresh_if_due(now) {
            RefreshCheck::NotScheduled => TickOutcome::NotScheduled,
            RefreshCheck::Due => {
                info!("refresh due, clearing stale snapshot");
                let _ = self.events.send(MonitorEvent::SnapshotChanged(Snapshot::empty()));

                let dispatched = self.trigger.request_refresh();
                TickOutcome::RefreshRequested { dispatched }
            }
            RefreshCheck::Pending { remaining } => {
                let remaining = remaining.to_std().unwrap_or_default();
                let _ = self.events.send(MonitorEvent::ScheduleTick { remaining });

                TickOutcome::Waiting { remaining }
            }
        }
    }

    /// Ticks every `period` until the trigger reports shutdown.
    pub async fn run(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match self.tick(Utc::now()) {
                TickOutcome::Stopped => break,
                TickOutcome::Waiting { remaining } => {
                    debug!(next_update_in = %format_remaining(remaining));
                }
                TickOutcome::RefreshRequested { dispatched } => {
                    debug!(dispatched, "refresh requested");
                }
                TickOutcome::NotScheduled => {}
            }
        }

        info!("refresh scheduler stopped");
    }
}
