use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures of the websocket session. Always recoverable by reconnecting.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("failed to send message: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("failed to receive message: {0}")]
    Receive(#[source] tungstenite::Error),

    #[error("connection closed by server")]
    Closed,
}

/// A single inbound payload that could not be turned into a snapshot.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed payload JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed item record in category {category}: {source}")]
    Record {
        category: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid lastUpdated timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_error_names_the_offending_value() {
        let source = chrono::NaiveDateTime::parse_from_str("not-a-date", "%Y-%m-%d").unwrap_err();
        let error = ParseError::Timestamp {
            value: "not-a-date".to_string(),
            source,
        };

        assert!(error.to_string().starts_with("invalid lastUpdated timestamp \"not-a-date\""));
    }

    #[test]
    fn connect_error_names_the_endpoint() {
        let error = TransportError::Connect {
            endpoint: "wss://example.invalid".to_string(),
            source: tungstenite::Error::ConnectionClosed,
        };

        assert!(error.to_string().contains("wss://example.invalid"));
    }
}
