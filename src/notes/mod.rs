// Recent notes: fan-out to every relay, fan-in through one aggregator,
// then pick the most recent non-expired notes.
//
// The aggregator owns all mutable state; relay sessions only push into
// its channel. Filters and the selector are pure functions.

pub mod aggregator;
pub mod filters;
pub mod selector;

pub use aggregator::{AggregationOutcome, AggregationState, Aggregator, RecordOutcome};
