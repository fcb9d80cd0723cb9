// Relay session: one relay's connect → subscribe → collect → teardown cycle.
//
// Each session runs as its own tokio task and reports back over a channel:
// every event record in delivery order, then exactly one `Done`. The
// deadline is fixed when the session starts and covers the connect phase;
// activity on the socket never extends it.
//
// Teardown (unsubscribe, then close) runs on every exit path after a
// successful connect. Its failures are logged and otherwise ignored.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use super::traits::{RelayConnection, Transport};
use super::Source;
use crate::nostr::{AggregationFilter, Record, RelayMessage};

/// Subscription id used in REQ / CLOSE frames. One subscription per connection.
pub const SUBSCRIPTION_ID: &str = "recent-notes";

/// Upper bound on each teardown call, so a stuck close can't hold up the run.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The relay sent EOSE for our subscription.
    EndOfStream,
    /// The relay sent CLOSED for our subscription.
    ClosedByRelay,
    /// The socket closed or a read failed before EOSE.
    Disconnected,
    /// The session deadline elapsed.
    TimedOut,
    /// The connect step itself failed.
    ConnectFailed,
    /// Sending the subscription request failed.
    SubscribeFailed,
    /// The task was cancelled or panicked before completing normally.
    Aborted,
}

/// Summary of one session, delivered with its `Done` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub address: String,
    pub termination: Termination,
    pub records_received: usize,
}

/// Messages a session sends to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Record(Record),
    Done(SourceReport),
}

/// Owns the session's side of the channel and guarantees exactly one `Done`.
///
/// `complete` sends it on the normal path; `Drop` sends `Aborted` if the
/// task is cancelled or unwinds first.
struct CompletionGuard {
    address: String,
    sink: Option<UnboundedSender<SessionEvent>>,
    records_received: usize,
}

impl CompletionGuard {
    fn new(address: &str, sink: UnboundedSender<SessionEvent>) -> Self {
        Self {
            address: address.to_string(),
            sink: Some(sink),
            records_received: 0,
        }
    }

    fn forward(&mut self, record: Record) {
        if let Some(sink) = &self.sink {
            // A closed channel means the aggregation already finished.
            if sink.send(SessionEvent::Record(record)).is_ok() {
                self.records_received += 1;
            }
        }
    }

    fn complete(mut self, termination: Termination) {
        self.finish(termination);
    }

    fn finish(&mut self, termination: Termination) {
        if let Some(sink) = self.sink.take() {
            let _ = sink.send(SessionEvent::Done(SourceReport {
                address: self.address.clone(),
                termination,
                records_received: self.records_received,
            }));
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.finish(Termination::Aborted);
    }
}

/// A connected relay plus whether our subscription is live on it.
struct OpenSession {
    connection: Box<dyn RelayConnection>,
    subscribed: bool,
}

impl OpenSession {
    /// Subscribe and forward records until the relay signals an end.
    async fn collect(
        &mut self,
        address: &str,
        filter: &AggregationFilter,
        guard: &mut CompletionGuard,
    ) -> Termination {
        if let Err(e) = self
            .connection
            .subscribe(SUBSCRIPTION_ID, std::slice::from_ref(filter))
            .await
        {
            warn!(relay = address, error = %e, "Subscription request failed");
            return Termination::SubscribeFailed;
        }
        self.subscribed = true;

        loop {
            match self.connection.next_message().await {
                Ok(Some(RelayMessage::Event {
                    subscription_id,
                    record,
                })) if subscription_id == SUBSCRIPTION_ID => guard.forward(record),
                Ok(Some(RelayMessage::EndOfStoredEvents { subscription_id }))
                    if subscription_id == SUBSCRIPTION_ID =>
                {
                    return Termination::EndOfStream;
                }
                Ok(Some(RelayMessage::Closed {
                    subscription_id,
                    message,
                })) if subscription_id == SUBSCRIPTION_ID => {
                    warn!(relay = address, message = %message, "Relay closed the subscription");
                    self.subscribed = false;
                    return Termination::ClosedByRelay;
                }
                Ok(Some(RelayMessage::Notice(notice))) => {
                    debug!(relay = address, notice = %notice, "Relay notice");
                }
                Ok(Some(other)) => {
                    debug!(relay = address, message = ?other, "Ignoring relay message");
                }
                Ok(None) => return Termination::Disconnected,
                Err(e) => {
                    warn!(relay = address, error = %e, "Relay read failed");
                    return Termination::Disconnected;
                }
            }
        }
    }

    /// Unsubscribe (if subscribed), then close. Never fails.
    async fn release(mut self, address: &str) {
        if self.subscribed {
            match timeout(TEARDOWN_TIMEOUT, self.connection.unsubscribe(SUBSCRIPTION_ID)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(relay = address, error = %e, "Unsubscribe failed"),
                Err(_) => warn!(relay = address, "Unsubscribe timed out"),
            }
        }

        match timeout(TEARDOWN_TIMEOUT, self.connection.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(relay = address, error = %e, "Closing relay connection failed"),
            Err(_) => warn!(relay = address, "Closing relay connection timed out"),
        }
    }
}

/// Run one relay session to completion.
///
/// Sends `SessionEvent::Record` for each event on our subscription, then
/// exactly one `SessionEvent::Done`, whatever the outcome. Never returns
/// an error: connection failures and timeouts end up in the report.
pub async fn run(
    transport: Arc<dyn Transport>,
    source: Source,
    filter: AggregationFilter,
    session_timeout: Duration,
    sink: UnboundedSender<SessionEvent>,
) {
    let deadline = Instant::now() + session_timeout;
    let address = source.address.as_str();
    let mut guard = CompletionGuard::new(address, sink);

    let connection = match timeout_at(deadline, transport.connect(address)).await {
        Ok(Ok(connection)) => connection,
        Ok(Err(e)) => {
            warn!(relay = address, error = %e, "Relay connection failed");
            guard.complete(Termination::ConnectFailed);
            return;
        }
        Err(_) => {
            warn!(relay = address, "Relay connection timed out");
            guard.complete(Termination::TimedOut);
            return;
        }
    };

    let mut session = OpenSession {
        connection,
        subscribed: false,
    };

    let collected = timeout_at(deadline, session.collect(address, &filter, &mut guard)).await;
    let termination = match collected {
        Ok(termination) => termination,
        Err(_) => {
            info!(
                relay = address,
                records = guard.records_received,
                "Relay timed out before end of stream"
            );
            Termination::TimedOut
        }
    };

    session.release(address).await;

    debug!(
        relay = address,
        termination = ?termination,
        records = guard.records_received,
        "Relay session finished"
    );

    guard.complete(termination);
}
