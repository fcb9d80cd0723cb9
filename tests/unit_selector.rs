// Unit tests for the final note selection.

use recent_notes::nostr::Record;
use recent_notes::notes::selector::{select_recent, select_recent_at};

fn note(id: &str, created_at: i64) -> Record {
    Record {
        id: id.to_string(),
        author: "pk".to_string(),
        created_at,
        kind: 30397,
        content: format!("note {id}"),
        tags: Vec::new(),
    }
}

fn expiring(id: &str, created_at: i64, expires_at: i64) -> Record {
    let mut record = note(id, created_at);
    record
        .tags
        .push(vec!["expiration".to_string(), expires_at.to_string()]);
    record
}

fn timestamps(records: &[Record]) -> Vec<i64> {
    records.iter().map(|r| r.created_at).collect()
}

#[test]
fn keeps_the_most_recent_in_ascending_order() {
    let records = vec![
        note("c", 300),
        note("a", 100),
        note("e", 500),
        note("b", 200),
        note("d", 400),
    ];
    let selected = select_recent_at(&records, 3, 1_000);
    assert_eq!(timestamps(&selected), vec![300, 400, 500]);
}

#[test]
fn fewer_records_than_show_count_returns_all() {
    let records = vec![note("b", 20), note("a", 10)];
    let selected = select_recent_at(&records, 7, 1_000);
    assert_eq!(timestamps(&selected), vec![10, 20]);
}

#[test]
fn show_count_zero_returns_nothing() {
    let records = vec![note("a", 10)];
    assert!(select_recent_at(&records, 0, 1_000).is_empty());
}

#[test]
fn empty_input_returns_nothing() {
    let records: Vec<Record> = Vec::new();
    assert!(select_recent_at(&records, 5, 1_000).is_empty());
}

#[test]
fn ties_keep_arrival_order() {
    let records = vec![note("first", 50), note("second", 50), note("third", 50)];
    let selected = select_recent_at(&records, 2, 1_000);
    let ids: Vec<&str> = selected.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["second", "third"]);
}

#[test]
fn expired_newest_note_is_excluded() {
    let records = vec![
        note("a", 100),
        note("b", 200),
        note("c", 300),
        expiring("newest", 900, 950),
    ];
    let selected = select_recent_at(&records, 3, 1_000);
    assert_eq!(timestamps(&selected), vec![100, 200, 300]);
}

#[test]
fn expiry_is_evaluated_at_the_given_instant() {
    let records = vec![expiring("a", 100, 500)];
    assert_eq!(select_recent_at(&records, 1, 499).len(), 1);
    assert!(select_recent_at(&records, 1, 500).is_empty());
}

#[test]
fn custom_expiry_predicate_is_honoured() {
    let records = vec![note("keep", 1), note("drop", 2)];
    let selected = select_recent(&records, 5, |r| r.id == "drop");
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, "keep");
}
