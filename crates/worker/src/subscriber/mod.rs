//! Notification channel subscriber.
//!
//! Holds the WebSocket connection to the ingest server, turns `new_file`
//! frames into [`NewFileEvent`]s and queues them for the consumer. Reading
//! runs separately from processing so the connection stays responsive
//! while a record is being processed.

mod client;
mod reconnect;

pub use client::{ChannelClient, ChannelClientError, ChannelStream};
pub use reconnect::{next_delay, reconnect_loop, ReconnectConfig};

use futures::{Stream, StreamExt};
use serveiq_events::{parse_message, ChannelMessage, NewFileEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;

/// Why [`forward_messages`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardEnd {
    /// The connection closed or failed.
    Disconnected,
    /// The consumer dropped its receiver.
    ConsumerGone,
}

/// Connect, forward events, and reconnect until `cancel` fires or the
/// consumer goes away.
pub async fn run(client: &ChannelClient, tx: mpsc::Sender<NewFileEvent>, cancel: &CancellationToken) {
    let config = ReconnectConfig::default();

    let mut stream = match client.connect().await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "Connection failed, entering reconnect loop");
            match reconnect_loop(client, &config, cancel).await {
                Some(stream) => stream,
                None => return,
            }
        }
    };

    loop {
        let end = tokio::select! {
            _ = cancel.cancelled() => None,
            end = forward_messages(&mut stream, &tx) => Some(end),
        };

        match end {
            None => {
                tracing::info!("Shutdown requested, closing notification channel");
                let _ = stream.close(None).await;
                return;
            }
            Some(ForwardEnd::ConsumerGone) => {
                tracing::info!("Consumer stopped, closing notification channel");
                let _ = stream.close(None).await;
                return;
            }
            Some(ForwardEnd::Disconnected) => {
                tracing::info!("Disconnected from notification channel");
            }
        }

        stream = match reconnect_loop(client, &config, cancel).await {
            Some(stream) => stream,
            None => return,
        };
    }
}

/// Read frames until the stream ends, queueing every `new_file` event.
pub async fn forward_messages<S>(stream: &mut S, tx: &mpsc::Sender<NewFileEvent>) -> ForwardEnd
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match parse_message(&text) {
                Ok(ChannelMessage::NewFile(event)) => {
                    tracing::debug!(document_id = %event.document_id, "Queued new_file event");
                    if tx.send(event).await.is_err() {
                        return ForwardEnd::ConsumerGone;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, raw_message = %text, "Ignoring unrecognised message");
                }
            },
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Server closed notification channel");
                return ForwardEnd::Disconnected;
            }
            // Pings are answered by tungstenite; binary frames are not used.
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Notification channel receive error");
                return ForwardEnd::Disconnected;
            }
        }
    }
    ForwardEnd::Disconnected
}
