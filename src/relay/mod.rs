// Relay connectivity: the transport seam, its WebSocket implementation,
// and the per-relay session that drives one subscription to completion.

pub mod session;
pub mod traits;
pub mod websocket;

pub use session::{SessionEvent, SourceReport, Termination};
pub use traits::{RelayConnection, Transport};
pub use websocket::WebSocketTransport;

/// One configured relay. Stateless; each aggregation run opens a fresh
/// session per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub address: String,
}

impl Source {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}
