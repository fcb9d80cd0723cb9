// Aggregator: fans out one session per relay and fans their records back in.
//
// All sessions share one unbounded channel. This task is the only reader
// and the only owner of AggregationState, so mutation needs no locks:
// each message is applied in full before the next is received.
//
// The run completes when every relay has reported `Done` (EOSE, failure,
// or timeout). The per-relay deadline is therefore the upper bound on the
// whole run. Completion is latched: selection happens once, and anything
// arriving after that is ignored.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{filters, selector};
use crate::config::Tunables;
use crate::nostr::{AggregationFilter, Record};
use crate::relay::{session, SessionEvent, Source, SourceReport, Transport};

/// What happened to a record handed to `AggregationState::apply_record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// New content record, stored.
    Inserted,
    /// Content record whose id was already stored; dropped.
    Duplicate,
    /// Identity label applied to the author → username map.
    IdentityLabel,
    /// Neither content nor a usable identity label.
    Ignored,
    /// Arrived after completion; dropped without touching state.
    Late,
}

/// Mutable state of one aggregation run.
#[derive(Debug)]
pub struct AggregationState {
    content_kind: u32,
    identity_label_kind: u32,
    username_namespace: String,
    /// Content records in first-seen order.
    records: Vec<Record>,
    seen_ids: HashSet<String>,
    identity_by_author: HashMap<String, String>,
    total_sources: usize,
    completed_sources: usize,
    done: bool,
    reports: Vec<SourceReport>,
}

impl AggregationState {
    pub fn new(tunables: &Tunables, total_sources: usize) -> Self {
        Self {
            content_kind: tunables.content_kind,
            identity_label_kind: tunables.identity_label_kind,
            username_namespace: tunables.username_namespace.clone(),
            records: Vec::new(),
            seen_ids: HashSet::new(),
            identity_by_author: HashMap::new(),
            total_sources,
            completed_sources: 0,
            done: total_sources == 0,
            reports: Vec::with_capacity(total_sources),
        }
    }

    /// Classify and store one delivered record.
    ///
    /// Identity labels update the username map (last applied wins) and are
    /// never content. Content records are kept on first sighting of their
    /// id; later copies are dropped. Expired records are stored too: expiry
    /// is decided at selection time.
    pub fn apply_record(&mut self, record: Record) -> RecordOutcome {
        if self.done {
            return RecordOutcome::Late;
        }

        if record.kind == self.identity_label_kind {
            return match filters::username_label(&record, &self.username_namespace) {
                Some(username) if !record.author.is_empty() => {
                    self.identity_by_author
                        .insert(record.author.clone(), username.to_string());
                    RecordOutcome::IdentityLabel
                }
                _ => RecordOutcome::Ignored,
            };
        }

        if record.kind != self.content_kind {
            return RecordOutcome::Ignored;
        }

        if !self.seen_ids.insert(record.id.clone()) {
            return RecordOutcome::Duplicate;
        }
        self.records.push(record);
        RecordOutcome::Inserted
    }

    /// Count one finished source. Returns true only on the call that
    /// completes the run; every later call is a no-op returning false.
    pub fn mark_source_done(&mut self, report: SourceReport) -> bool {
        if self.done {
            return false;
        }
        self.completed_sources += 1;
        self.reports.push(report);
        if self.completed_sources >= self.total_sources {
            self.done = true;
            return true;
        }
        false
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn completed_sources(&self) -> usize {
        self.completed_sources
    }

    /// Content records in first-seen order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn identity_by_author(&self) -> &HashMap<String, String> {
        &self.identity_by_author
    }

    /// Run the selector and hand over the result. Consumes the state, so
    /// selection can only ever happen once per run.
    pub fn into_outcome(self, show_count: usize, now: i64) -> AggregationOutcome {
        let notes = selector::select_recent_at(&self.records, show_count, now);
        AggregationOutcome {
            notes,
            identity_by_author: self.identity_by_author,
            sources: self.reports,
        }
    }
}

/// Result of one run, handed to the presenter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregationOutcome {
    /// Selected notes, oldest first.
    pub notes: Vec<Record>,
    /// Author pubkey → username, from identity labels seen during the run.
    pub identity_by_author: HashMap<String, String>,
    /// One report per relay, in completion order.
    pub sources: Vec<SourceReport>,
}

/// Coordinates relay sessions into one result.
pub struct Aggregator {
    transport: Arc<dyn Transport>,
    tunables: Tunables,
}

impl Aggregator {
    pub fn new(transport: Arc<dyn Transport>, tunables: Tunables) -> Self {
        Self {
            transport,
            tunables,
        }
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Query every source concurrently and return the selected notes.
    ///
    /// Never fails: relays that can't be reached or time out contribute
    /// whatever they delivered (possibly nothing). With no sources at all
    /// the outcome is empty.
    pub async fn run(&self, sources: &[Source], filter: &AggregationFilter) -> AggregationOutcome {
        let mut state = AggregationState::new(&self.tunables, sources.len());
        let show_count = self.tunables.show_count;

        if sources.is_empty() {
            info!("No relays configured, nothing to fetch");
            return state.into_outcome(show_count, chrono::Utc::now().timestamp());
        }

        let (sink, mut inbox) = mpsc::unbounded_channel();
        for source in sources {
            tokio::spawn(session::run(
                Arc::clone(&self.transport),
                source.clone(),
                filter.clone(),
                self.tunables.per_source_timeout,
                sink.clone(),
            ));
        }
        drop(sink);

        while let Some(event) = inbox.recv().await {
            match event {
                SessionEvent::Record(record) => {
                    let id = record.id.clone();
                    let outcome = state.apply_record(record);
                    debug!(id = %id, outcome = ?outcome, "Record received");
                }
                SessionEvent::Done(report) => {
                    info!(
                        relay = %report.address,
                        termination = ?report.termination,
                        records = report.records_received,
                        completed = state.completed_sources() + 1,
                        total = sources.len(),
                        "Relay finished"
                    );
                    if state.mark_source_done(report) {
                        break;
                    }
                }
            }
        }

        if !state.is_done() {
            // Every session sends Done before its sender drops, so this
            // only happens if the runtime is shutting down under us.
            warn!(
                completed = state.completed_sources(),
                total = sources.len(),
                "Relay sessions ended without all reporting completion"
            );
        }

        let outcome = state.into_outcome(show_count, chrono::Utc::now().timestamp());
        info!(
            notes = outcome.notes.len(),
            usernames = outcome.identity_by_author.len(),
            "Aggregation complete"
        );
        outcome
    }
}
