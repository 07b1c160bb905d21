use async_trait::async_trait;

use crate::error::TransportError;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Session>, TransportError>;
}

/// One live streaming session. `recv` must be safe to cancel between frames.
#[async_trait]
pub trait Session: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Next text frame. A close from the server is reported as `TransportError::Closed`.
    async fn recv(&mut self) -> Result<String, TransportError>;

    async fn close(&mut self);
}
