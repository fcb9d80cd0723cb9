// recent-notes: the most recent map notes from several Nostr relays.
//
// This is the library root. Each module corresponds to one stage of the
// fetch: wire types, relay sessions, aggregation/selection, and output.

pub mod config;
pub mod nostr;
pub mod notes;
pub mod output;
pub mod relay;
