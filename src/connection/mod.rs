pub mod connection_manager;
pub mod transport;
pub mod websocket_transport;
