// Record predicates and tag lookups.
//
// Malformed or missing tag data always means "feature absent": these
// functions never fail.

use crate::nostr::Record;

/// Tag kind carrying a unix timestamp after which the record is stale (NIP-40).
pub const EXPIRATION_TAG: &str = "expiration";

/// Tag kind for namespaced labels (NIP-32): `["l", <value>, <namespace>]`.
pub const LABEL_TAG: &str = "l";

/// Label namespace of the plus code (open location code) attached to map notes.
pub const PLUS_CODE_NAMESPACE: &str = "open-location-code";

/// True if the record carries an expiration tag at or before `now`.
///
/// Only tags with an integer second element count. Any number of
/// expiration tags may be present; one past-due tag is enough.
pub fn is_expired(record: &Record, now: i64) -> bool {
    record
        .tags_of_kind(EXPIRATION_TAG)
        .filter_map(|tag| tag.get(1))
        .filter_map(|value| value.trim().parse::<i64>().ok())
        .any(|expires_at| expires_at <= now)
}

/// Value of the first `["l", <value>, <marker>, ..]` tag, in tag order.
///
/// Returns `None` when no tag matches or the first matching tag has an
/// empty value.
pub fn find_label<'a>(record: &'a Record, marker: &str) -> Option<&'a str> {
    record
        .tags_of_kind(LABEL_TAG)
        .find(|tag| tag.len() >= 3 && tag[2] == marker)
        .map(|tag| tag[1].as_str())
        .filter(|value| !value.is_empty())
}

/// Plus code of a map note, if it has one.
pub fn plus_code(record: &Record) -> Option<&str> {
    find_label(record, PLUS_CODE_NAMESPACE)
}

/// Username carried by an identity-label (profile) record.
pub fn username_label<'a>(record: &'a Record, namespace: &str) -> Option<&'a str> {
    find_label(record, namespace)
}
