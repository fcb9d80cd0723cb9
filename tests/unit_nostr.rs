// Unit tests for relay message framing and event deserialization.
//
// All offline: frames are literal JSON strings as a relay would send them.

use recent_notes::nostr::message::{close_frame, req_frame};
use recent_notes::nostr::{AggregationFilter, Record, RelayMessage};

const EVENT_JSON: &str = r#"{
    "id": "abc123",
    "pubkey": "pk999",
    "created_at": 1700000000,
    "kind": 30397,
    "tags": [["l", "8FVC9G8F+6X", "open-location-code"], ["expiration", "1800000000"]],
    "content": "Nice spot to camp",
    "sig": "deadbeef"
}"#;

#[test]
fn deserialize_event_ignores_signature() {
    let record: Record = serde_json::from_str(EVENT_JSON).unwrap();
    assert_eq!(record.id, "abc123");
    assert_eq!(record.author, "pk999");
    assert_eq!(record.created_at, 1_700_000_000);
    assert_eq!(record.kind, 30397);
    assert_eq!(record.tags.len(), 2);
    assert_eq!(record.content, "Nice spot to camp");
}

#[test]
fn deserialize_event_without_tags_or_content() {
    let json = r#"{"id": "x", "pubkey": "p", "created_at": 1, "kind": 1}"#;
    let record: Record = serde_json::from_str(json).unwrap();
    assert!(record.tags.is_empty());
    assert!(record.content.is_empty());
}

#[test]
fn parse_event_message() {
    let frame = format!(r#"["EVENT", "sub1", {EVENT_JSON}]"#);
    match RelayMessage::parse(&frame).unwrap() {
        RelayMessage::Event {
            subscription_id,
            record,
        } => {
            assert_eq!(subscription_id, "sub1");
            assert_eq!(record.id, "abc123");
        }
        other => panic!("expected EVENT, got {other:?}"),
    }
}

#[test]
fn parse_eose() {
    assert_eq!(
        RelayMessage::parse(r#"["EOSE", "sub1"]"#).unwrap(),
        RelayMessage::EndOfStoredEvents {
            subscription_id: "sub1".to_string()
        }
    );
}

#[test]
fn parse_closed_with_reason() {
    assert_eq!(
        RelayMessage::parse(r#"["CLOSED", "sub1", "rate-limited: slow down"]"#).unwrap(),
        RelayMessage::Closed {
            subscription_id: "sub1".to_string(),
            message: "rate-limited: slow down".to_string(),
        }
    );
}

#[test]
fn parse_notice() {
    assert_eq!(
        RelayMessage::parse(r#"["NOTICE", "hello"]"#).unwrap(),
        RelayMessage::Notice("hello".to_string())
    );
}

#[test]
fn unknown_label_is_other() {
    assert_eq!(
        RelayMessage::parse(r#"["OK", "abc", true, ""]"#).unwrap(),
        RelayMessage::Other("OK".to_string())
    );
}

#[test]
fn malformed_frames_are_errors() {
    assert!(RelayMessage::parse("not json").is_err());
    assert!(RelayMessage::parse(r#"{"EVENT": 1}"#).is_err());
    assert!(RelayMessage::parse("[]").is_err());
    assert!(RelayMessage::parse(r#"[42]"#).is_err());
    assert!(RelayMessage::parse(r#"["EVENT", "sub1"]"#).is_err());
    assert!(RelayMessage::parse(r#"["EVENT", "sub1", {"id": "x"}]"#).is_err());
}

#[test]
fn req_frame_carries_filter_verbatim() {
    let filter = AggregationFilter {
        kinds: vec![30397, 10390],
        limit: 200,
    };
    let frame = req_frame("recent-notes", &[filter]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(
        value,
        serde_json::json!(["REQ", "recent-notes", {"kinds": [30397, 10390], "limit": 200}])
    );
}

#[test]
fn close_frame_names_subscription() {
    assert_eq!(close_frame("recent-notes"), r#"["CLOSE","recent-notes"]"#);
}
