// Output formatting: terminal display and the small text helpers it uses.

pub mod terminal;

use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

/// Truncate a string to at most `max_chars` characters, appending "…" if truncated.
///
/// Counts characters, not bytes, so it never splits a multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}…")
    }
}

/// First eight characters of a note id followed by "+", or "—" if empty.
pub fn short_note_id(id: &str) -> String {
    if id.is_empty() {
        return "—".to_string();
    }
    let prefix: String = id.chars().take(8).collect();
    format!("{prefix}+")
}

/// `@username` when the author has a known username, otherwise a shortened
/// pubkey. "—" when the author is empty.
pub fn author_display(author: &str, usernames: &HashMap<String, String>) -> String {
    if author.is_empty() {
        return "—".to_string();
    }
    match usernames.get(author) {
        Some(username) => format!("@{username}"),
        None => truncate_chars(author, 12),
    }
}

/// `YYYY-MM-DD HH:MM` in local time.
pub fn format_date(timestamp: i64) -> String {
    format_date_in(timestamp, &Local)
}

/// `YYYY-MM-DD HH:MM` in the given time zone; "—" for out-of-range timestamps.
pub fn format_date_in<Tz>(timestamp: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        None => "—".to_string(),
    }
}

/// Compact age of a timestamp relative to `now`: now, 5m, 3h, 2d, 4mo, 1y.
pub fn format_relative_time(timestamp: i64, now: i64) -> String {
    let diff = now - timestamp;
    if diff < 60 {
        "now".to_string()
    } else if diff < 3_600 {
        format!("{}m", diff / 60)
    } else if diff < 86_400 {
        format!("{}h", diff / 3_600)
    } else if diff < 2_592_000 {
        format!("{}d", diff / 86_400)
    } else if diff < 31_536_000 {
        format!("{}mo", diff / 2_592_000)
    } else {
        format!("{}y", diff / 31_536_000)
    }
}
