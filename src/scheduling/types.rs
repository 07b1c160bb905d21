use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No server timestamp has arrived yet.
    NotScheduled,
    Waiting { remaining: Duration },
    RefreshRequested { dispatched: bool },
    Stopped,
}
