use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::connection::transport::{Session, Transport};
use crate::error::TransportError;

#[derive(Debug, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn Session>, TransportError> {
        let (stream, _http_response) =
            connect_async(endpoint)
                .await
                .map_err(|source| TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })?;

        Ok(Box::new(WebSocketSession { stream }))
    }
}

struct WebSocketSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Session for WebSocketSession {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(TransportError::Send)
    }

    async fn recv(&mut self) -> Result<String, TransportError> {
        loop {
            let message = match self.stream.next().await {
                Some(message) => message.map_err(TransportError::Receive)?,
                None => return Err(TransportError::Closed),
            };

            match message {
                Message::Text(text) => return Ok(text),
                Message::Binary(binary) => match String::from_utf8(binary) {
                    Ok(text) => return Ok(text),
                    Err(_) => debug!("ignoring non UTF-8 binary frame"),
                },
                Message::Close(frame) => {
                    warn!(?frame, "websocket closed by server");
                    return Err(TransportError::Closed);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) {
        if let Err(error) = self.stream.close(None).await {
            debug!(%error, "websocket close handshake failed");
        }
    }
}
