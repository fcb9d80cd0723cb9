use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::nostr::AggregationFilter;
use crate::relay::Source;

/// Relays queried when RECENT_NOTES_RELAYS is unset.
pub const DEFAULT_RELAYS: &[&str] = &["wss://relay.trustroots.org", "wss://relay.nomadwiki.org"];

/// Map note kind (Nostroots).
pub const DEFAULT_CONTENT_KIND: u32 = 30397;

/// Trustroots profile kind: carries the username label.
pub const DEFAULT_IDENTITY_LABEL_KIND: u32 = 10390;

/// Label namespace of the Trustroots username on profile events.
pub const DEFAULT_USERNAME_NAMESPACE: &str = "org.trustroots:username";

pub const DEFAULT_FETCH_LIMIT: u32 = 200;
pub const DEFAULT_SHOW_COUNT: usize = 7;
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

/// Knobs for a single aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunables {
    /// Kind of the records to show.
    pub content_kind: u32,
    /// Kind of the records that map an author to a username.
    pub identity_label_kind: u32,
    /// Label namespace holding the username on identity-label records.
    pub username_namespace: String,
    /// `limit` sent to each relay.
    pub fetch_limit: u32,
    /// How many notes end up in the result.
    pub show_count: usize,
    /// Fixed deadline for each relay session, from session start.
    pub per_source_timeout: Duration,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            content_kind: DEFAULT_CONTENT_KIND,
            identity_label_kind: DEFAULT_IDENTITY_LABEL_KIND,
            username_namespace: DEFAULT_USERNAME_NAMESPACE.to_string(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            show_count: DEFAULT_SHOW_COUNT,
            per_source_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl Tunables {
    /// The filter every relay is subscribed with: both kinds, one limit.
    pub fn filter(&self) -> AggregationFilter {
        AggregationFilter {
            kinds: vec![self.content_kind, self.identity_label_kind],
            limit: self.fetch_limit,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Everything has a default, so an empty environment yields the
/// Trustroots setup. The .env file is loaded at startup via dotenvy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Relay WebSocket addresses, in the order they were configured.
    pub relays: Vec<String>,
    pub tunables: Tunables,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let relays = match lookup("RECENT_NOTES_RELAYS") {
            Some(list) => parse_relay_list(&list),
            None => DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
        };

        let defaults = Tunables::default();
        let timeout_ms = parse_var(&lookup, "RECENT_NOTES_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;

        let tunables = Tunables {
            content_kind: parse_var(&lookup, "RECENT_NOTES_CONTENT_KIND", defaults.content_kind)?,
            identity_label_kind: parse_var(
                &lookup,
                "RECENT_NOTES_IDENTITY_KIND",
                defaults.identity_label_kind,
            )?,
            username_namespace: lookup("RECENT_NOTES_USERNAME_NAMESPACE")
                .filter(|ns| !ns.trim().is_empty())
                .unwrap_or(defaults.username_namespace),
            fetch_limit: parse_var(&lookup, "RECENT_NOTES_FETCH_LIMIT", defaults.fetch_limit)?,
            show_count: parse_var(&lookup, "RECENT_NOTES_SHOW_COUNT", defaults.show_count)?,
            per_source_timeout: Duration::from_millis(timeout_ms),
        };

        Ok(Self { relays, tunables })
    }

    /// Sources for an aggregation run, one per configured relay.
    pub fn sources(&self) -> Vec<Source> {
        self.relays.iter().map(Source::new).collect()
    }

    /// Check that at least one relay is configured.
    /// An empty list is valid for the library (it yields no notes), but
    /// almost always a configuration mistake on the command line.
    pub fn require_sources(&self) -> Result<()> {
        if self.relays.is_empty() {
            anyhow::bail!(
                "No relays configured. Set RECENT_NOTES_RELAYS to a comma-separated\n\
                 list of wss:// addresses, or pass --relay."
            );
        }
        Ok(())
    }
}

/// Split a comma-separated relay list, dropping blanks.
pub fn parse_relay_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|relay| !relay.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
        _ => Ok(default),
    }
}
