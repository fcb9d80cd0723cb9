// Transport trait: the swap-ready abstraction over relay connections.
//
// The session only needs connect / subscribe / read / unsubscribe / close.
// Production uses WebSocketTransport; tests script their own transport
// to exercise timeouts, failures, and duplicate deliveries without a network.

use anyhow::Result;
use async_trait::async_trait;

use crate::nostr::{AggregationFilter, RelayMessage};

/// Opens connections to relays by address.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the relay at `address`. May fail or hang; callers bound it
    /// with their own deadline.
    async fn connect(&self, address: &str) -> Result<Box<dyn RelayConnection>>;
}

/// An open connection to a single relay. Every call may fail.
#[async_trait]
pub trait RelayConnection: Send {
    /// Open a subscription with the given filters.
    async fn subscribe(&mut self, subscription_id: &str, filters: &[AggregationFilter])
        -> Result<()>;

    /// Wait for the next message. `Ok(None)` means the relay closed the
    /// connection.
    async fn next_message(&mut self) -> Result<Option<RelayMessage>>;

    /// Cancel a subscription previously opened with `subscribe`.
    async fn unsubscribe(&mut self, subscription_id: &str) -> Result<()>;

    /// Close the connection.
    async fn close(&mut self) -> Result<()>;
}
