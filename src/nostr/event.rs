// Event and filter types as they appear on the wire.

use serde::{Deserialize, Serialize};

/// A tag is an ordered list of strings; `tag[0]` is its kind.
pub type Tag = Vec<String>;

/// A single relay event: just the fields the notes pipeline reads.
///
/// `id` is the dedup key: the same event can arrive from several relays
/// and is assumed immutable per id. The wire name of `author` is `pubkey`;
/// `sig` and any other extra fields are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "pubkey")]
    pub author: String,
    pub created_at: i64,
    pub kind: u32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Record {
    /// Iterate over tags whose kind (first element) equals `kind`.
    pub fn tags_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags
            .iter()
            .filter(move |tag| tag.first().map(String::as_str) == Some(kind))
    }
}

/// Subscription filter sent verbatim in the REQ message.
///
/// Serializes to `{"kinds":[..],"limit":N}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationFilter {
    pub kinds: Vec<u32>,
    pub limit: u32,
}
