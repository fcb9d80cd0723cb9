// WebSocket transport: NIP-01 over tokio-tungstenite.
//
// A thin wrapper: REQ and CLOSE frames go out as JSON text, incoming text
// frames are parsed into RelayMessage. Ping/pong is answered by tungstenite
// on the next read; binary frames are not part of the protocol and skipped.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::traits::{RelayConnection, Transport};
use crate::nostr::message::{close_frame, req_frame};
use crate::nostr::{AggregationFilter, RelayMessage};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production transport: opens a WebSocket per relay address.
#[derive(Debug, Default, Clone)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, address: &str) -> Result<Box<dyn RelayConnection>> {
        let (socket, response) = connect_async(address)
            .await
            .with_context(|| format!("WebSocket handshake with {address} failed"))?;

        debug!(relay = address, status = %response.status(), "Relay connected");

        Ok(Box::new(WebSocketConnection {
            address: address.to_string(),
            socket,
        }))
    }
}

/// One open relay socket.
pub struct WebSocketConnection {
    address: String,
    socket: Socket,
}

impl WebSocketConnection {
    async fn send_text(&mut self, frame: String) -> Result<()> {
        self.socket
            .send(Message::Text(frame.into()))
            .await
            .with_context(|| format!("Failed to send frame to {}", self.address))
    }
}

#[async_trait]
impl RelayConnection for WebSocketConnection {
    async fn subscribe(
        &mut self,
        subscription_id: &str,
        filters: &[AggregationFilter],
    ) -> Result<()> {
        let frame = req_frame(subscription_id, filters)?;
        self.send_text(frame).await
    }

    async fn next_message(&mut self) -> Result<Option<RelayMessage>> {
        while let Some(frame) = self.socket.next().await {
            let frame = frame.with_context(|| format!("Read from {} failed", self.address))?;
            match frame {
                Message::Text(text) => match RelayMessage::parse(&text) {
                    Ok(message) => return Ok(Some(message)),
                    Err(e) => {
                        warn!(relay = %self.address, error = %e, "Skipping malformed relay frame");
                    }
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    async fn unsubscribe(&mut self, subscription_id: &str) -> Result<()> {
        self.send_text(close_frame(subscription_id)).await
    }

    async fn close(&mut self) -> Result<()> {
        self.socket
            .close(None)
            .await
            .with_context(|| format!("Failed to close connection to {}", self.address))
    }
}
