//! WebSocket client for the ingest server's notification channel.

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Live connection to the notification channel.
pub type ChannelStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection settings for the notification channel.
#[derive(Debug, Clone)]
pub struct ChannelClient {
    url: String,
}

impl ChannelClient {
    /// `url` is the server's WebSocket endpoint, e.g. `ws://host:5000/ws`.
    pub fn new(url: String) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open a connection.
    pub async fn connect(&self) -> Result<ChannelStream, ChannelClientError> {
        let (stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            ChannelClientError::Connection(format!("Failed to connect to {}: {e}", self.url))
        })?;

        tracing::info!(url = %self.url, "Connected to notification channel");
        Ok(stream)
    }
}

/// Errors that can occur when working with the channel client.
#[derive(Debug, thiserror::Error)]
pub enum ChannelClientError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}
