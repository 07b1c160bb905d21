pub mod connection_state;
pub mod inventory_item;
pub mod price;
pub mod quality;
pub mod schedule_state;
pub mod snapshot;
