// Final selection: drop expired notes, keep the most recent `show_count`,
// oldest first.

use crate::nostr::Record;

use super::filters;

/// Pick the `show_count` most recent records that aren't expired.
///
/// `records` is expected in arrival order: the sort by `created_at` is
/// stable, so equal timestamps keep that order. The result is ascending
/// by `created_at`.
pub fn select_recent<'a, I, F>(records: I, show_count: usize, mut is_expired: F) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
    F: FnMut(&Record) -> bool,
{
    let mut live: Vec<&Record> = records
        .into_iter()
        .filter(|record| !is_expired(*record))
        .collect();

    live.sort_by_key(|record| record.created_at);

    let skip = live.len().saturating_sub(show_count);
    live.into_iter().skip(skip).cloned().collect()
}

/// `select_recent` with expiry evaluated at `now` (unix seconds).
pub fn select_recent_at<'a, I>(records: I, show_count: usize, now: i64) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    select_recent(records, show_count, |record| filters::is_expired(record, now))
}
