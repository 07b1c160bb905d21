pub mod payload;
pub mod snapshot_ingestor;
