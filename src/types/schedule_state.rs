use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub last_update_time: Option<DateTime<Utc>>,
    pub next_update_time: Option<DateTime<Utc>>,
    pub interval: TimeDelta,
}

impl ScheduleState {
    pub fn new(interval: TimeDelta) -> Self {
        Self {
            last_update_time: None,
            next_update_time: None,
            interval,
        }
    }

    /// Records a server-side update and derives the next expected one from it.
    pub fn record_update(&mut self, last_update_time: DateTime<Utc>) {
        self.last_update_time = Some(last_update_time);
        self.next_update_time = Some(last_update_time + self.interval);
    }

    /// Pushes the next expected update one interval past `now`.
    pub fn advance_from(&mut self, now: DateTime<Utc>) {
        self.next_update_time = Some(now + self.interval);
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_update_time.is_some_and(|next| now >= next)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.next_update_time
            .map(|next| (next - now).max(TimeDelta::zero()))
    }
}
