// Relay-to-client and client-to-relay message framing (NIP-01).
//
// Messages are JSON arrays whose first element is a label:
//   ["EVENT", <sub_id>, <event>]
//   ["EOSE", <sub_id>]
//   ["CLOSED", <sub_id>, <message>]
//   ["NOTICE", <message>]
// Anything else (OK, AUTH, COUNT...) is surfaced as `Other` and ignored
// by the session.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::event::{AggregationFilter, Record};

/// A parsed message received from a relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    Event {
        subscription_id: String,
        record: Record,
    },
    EndOfStoredEvents {
        subscription_id: String,
    },
    Closed {
        subscription_id: String,
        message: String,
    },
    Notice(String),
    Other(String),
}

impl RelayMessage {
    /// Parse one text frame from a relay.
    ///
    /// Fails on frames that are not JSON arrays, have a non-string label,
    /// or carry an EVENT payload that isn't a valid event.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).context("Relay frame is not valid JSON")?;
        let Value::Array(items) = value else {
            bail!("Relay frame is not a JSON array");
        };

        let label = items
            .first()
            .and_then(Value::as_str)
            .context("Relay frame has no message label")?;

        let string_at = |index: usize| -> String {
            items
                .get(index)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match label {
            "EVENT" => {
                let payload = items.get(2).cloned().context("EVENT frame has no payload")?;
                let record: Record =
                    serde_json::from_value(payload).context("EVENT payload is not a valid event")?;
                Ok(Self::Event {
                    subscription_id: string_at(1),
                    record,
                })
            }
            "EOSE" => Ok(Self::EndOfStoredEvents {
                subscription_id: string_at(1),
            }),
            "CLOSED" => Ok(Self::Closed {
                subscription_id: string_at(1),
                message: string_at(2),
            }),
            "NOTICE" => Ok(Self::Notice(string_at(1))),
            other => Ok(Self::Other(other.to_string())),
        }
    }
}

/// Build a `["REQ", <sub_id>, <filter>...]` frame.
pub fn req_frame(subscription_id: &str, filters: &[AggregationFilter]) -> Result<String> {
    let mut frame = vec![Value::from("REQ"), Value::from(subscription_id)];
    for filter in filters {
        frame.push(serde_json::to_value(filter).context("Failed to serialize filter")?);
    }
    Ok(Value::Array(frame).to_string())
}

/// Build a `["CLOSE", <sub_id>]` frame.
pub fn close_frame(subscription_id: &str) -> String {
    Value::Array(vec![Value::from("CLOSE"), Value::from(subscription_id)]).to_string()
}
