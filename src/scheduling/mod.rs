pub mod refresh_scheduler;
pub mod types;
