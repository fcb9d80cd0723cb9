// Nostr wire types: events, subscription filters, and relay messages.
//
// Only the slice of NIP-01 the notes fetcher needs: reading events,
// sending a REQ with one filter, and recognising EOSE / CLOSED / NOTICE.
// Signatures are not verified; relays are trusted for content, not for
// honouring the filter.

pub mod event;
pub mod message;

pub use event::{AggregationFilter, Record, Tag};
pub use message::RelayMessage;
