use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::types::{
    connection_state::ConnectionState, schedule_state::ScheduleState, snapshot::Snapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCheck {
    /// No server timestamp has been seen yet.
    NotScheduled,
    /// The refresh boundary was crossed; the snapshot has been cleared.
    Due,
    Pending { remaining: TimeDelta },
}

struct StoreState {
    snapshot: Snapshot,
    schedule: ScheduleState,
    connection: ConnectionState,
}

/// Latest inventory plus schedule and connection status behind a single lock.
pub struct SnapshotStore {
    state: Mutex<StoreState>,
}

impl SnapshotStore {
    pub fn new(interval: TimeDelta) -> Self {
        Self {
            state: Mutex::new(StoreState {
                snapshot: Snapshot::empty(),
                schedule: ScheduleState::new(interval),
                connection: ConnectionState::Disconnected,
            }),
        }
    }

    pub fn replace(&self, snapshot: Snapshot, last_update_time: Option<DateTime<Utc>>) {
        let mut state = self.state.lock();
        state.snapshot = snapshot;

        if let Some(last_update_time) = last_update_time {
            state.schedule.record_update(last_update_time);
        }
    }

    pub fn read(&self) -> Snapshot {
        self.state.lock().snapshot.clone()
    }

    pub fn peek_schedule(&self) -> ScheduleState {
        self.state.lock().schedule
    }

    /// Clears the snapshot and pushes the schedule forward if a refresh is due at `now`.
    pub fn begin_refresh_if_due(&self, now: DateTime<Utc>) -> RefreshCheck {
        let mut state = self.state.lock();

        if state.schedule.is_due(now) {
            state.snapshot = Snapshot::empty();
            state.schedule.advance_from(now);

            return RefreshCheck::Due;
        }

        match state.schedule.remaining(now) {
            Some(remaining) => RefreshCheck::Pending { remaining },
            None => RefreshCheck::NotScheduled,
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection
    }

    /// Returns `true` when the state actually changed.
    pub fn set_connection_state(&self, connection: ConnectionState) -> bool {
        let mut state = self.state.lock();
        let changed = state.connection != connection;
        state.connection = connection;
        changed
    }
}

impl fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SnapshotStore")
            .field("items", &state.snapshot.len())
            .field("schedule", &state.schedule)
            .field("connection", &state.connection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use chrono::TimeZone;

    use super::*;
    use crate::types::{inventory_item::InventoryItem, price::Price};

    fn interval() -> TimeDelta {
        TimeDelta::minutes(5) + TimeDelta::seconds(3)
    }

    fn snapshot_of(len: usize) -> Snapshot {
        (0..len)
            .map(|index| {
                InventoryItem::new("SEEDS", Some(format!("item-{index}")), Price::Unknown, 1, None)
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn replace_with_timestamp_derives_next_update() {
        let store = SnapshotStore::new(interval());
        let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        store.replace(snapshot_of(2), Some(last));

        let schedule = store.peek_schedule();
        assert_eq!(schedule.last_update_time, Some(last));
        assert_eq!(schedule.next_update_time, Some(last + interval()));
        assert_eq!(store.read().len(), 2);
    }

    #[test]
    fn replace_without_timestamp_keeps_schedule() {
        let store = SnapshotStore::new(interval());
        let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        store.replace(snapshot_of(1), Some(last));
        let before = store.peek_schedule();

        store.replace(snapshot_of(3), None);

        assert_eq!(store.peek_schedule(), before);
        assert_eq!(store.read().len(), 3);
    }

    #[test]
    fn refresh_check_clears_and_advances_once_due() {
        let store = SnapshotStore::new(interval());
        let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(store.begin_refresh_if_due(last), RefreshCheck::NotScheduled);

        store.replace(snapshot_of(4), Some(last));
        assert_eq!(
            store.begin_refresh_if_due(last + TimeDelta::seconds(3)),
            RefreshCheck::Pending {
                remaining: TimeDelta::minutes(5)
            }
        );

        let due = last + interval();
        assert_eq!(store.begin_refresh_if_due(due), RefreshCheck::Due);
        assert!(store.read().is_empty());
        assert_eq!(store.peek_schedule().next_update_time, Some(due + interval()));
        assert!(matches!(
            store.begin_refresh_if_due(due),
            RefreshCheck::Pending { .. }
        ));
    }

    #[test]
    fn connection_state_reports_changes() {
        let store = SnapshotStore::new(interval());

        assert!(!store.set_connection_state(ConnectionState::Disconnected));
        assert!(store.set_connection_state(ConnectionState::Reconnecting));
        assert_eq!(store.connection_state(), ConnectionState::Reconnecting);
    }

    #[test]
    fn concurrent_readers_never_see_partial_snapshots() {
        let store = Arc::new(SnapshotStore::new(interval()));
        let done = Arc::new(AtomicBool::new(false));
        let sizes = [0usize, 7, 31, 64];

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        let snapshot = store.read();
                        assert!(sizes.contains(&snapshot.len()));
                        if let Some(first) = snapshot.items().first() {
                            let prefix_ok = snapshot
                                .iter()
                                .enumerate()
                                .all(|(index, item)| item.name() == Some(&format!("item-{index}")[..]));
                            assert!(prefix_ok, "mixed snapshot starting at {first:?}");
                        }
                    }
                })
            })
            .collect();

        for round in 0..2_000 {
            store.replace(snapshot_of(sizes[round % sizes.len()]), None);
        }
        done.store(true, Ordering::Relaxed);

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
