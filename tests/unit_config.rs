// Unit tests for configuration loading.
//
// Uses Config::from_lookup with an in-memory map so tests never touch
// the process environment.

use std::collections::HashMap;
use std::time::Duration;

use recent_notes::config::{parse_relay_list, Config, Tunables, DEFAULT_RELAYS};

fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn empty_environment_uses_defaults() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.relays, DEFAULT_RELAYS);
    assert_eq!(config.tunables, Tunables::default());
    assert_eq!(config.tunables.content_kind, 30397);
    assert_eq!(config.tunables.identity_label_kind, 10390);
    assert_eq!(config.tunables.fetch_limit, 200);
    assert_eq!(config.tunables.show_count, 7);
    assert_eq!(config.tunables.per_source_timeout, Duration::from_millis(8000));
}

#[test]
fn overrides_are_applied() {
    let config = config_from(&[
        ("RECENT_NOTES_RELAYS", "wss://a.example, wss://b.example"),
        ("RECENT_NOTES_SHOW_COUNT", "3"),
        ("RECENT_NOTES_FETCH_LIMIT", "50"),
        ("RECENT_NOTES_TIMEOUT_MS", "2500"),
        ("RECENT_NOTES_CONTENT_KIND", "1"),
        ("RECENT_NOTES_IDENTITY_KIND", "0"),
        ("RECENT_NOTES_USERNAME_NAMESPACE", "example:user"),
    ])
    .unwrap();

    assert_eq!(config.relays, vec!["wss://a.example", "wss://b.example"]);
    assert_eq!(config.tunables.show_count, 3);
    assert_eq!(config.tunables.fetch_limit, 50);
    assert_eq!(config.tunables.per_source_timeout, Duration::from_millis(2500));
    assert_eq!(config.tunables.content_kind, 1);
    assert_eq!(config.tunables.identity_label_kind, 0);
    assert_eq!(config.tunables.username_namespace, "example:user");
}

#[test]
fn malformed_number_is_an_error_naming_the_variable() {
    let err = config_from(&[("RECENT_NOTES_SHOW_COUNT", "seven")]).unwrap_err();
    assert!(err.to_string().contains("RECENT_NOTES_SHOW_COUNT"));
}

#[test]
fn negative_timeout_is_rejected() {
    assert!(config_from(&[("RECENT_NOTES_TIMEOUT_MS", "-5")]).is_err());
}

#[test]
fn blank_number_falls_back_to_default() {
    let config = config_from(&[("RECENT_NOTES_FETCH_LIMIT", "  ")]).unwrap();
    assert_eq!(config.tunables.fetch_limit, 200);
}

#[test]
fn blank_relay_list_means_no_relays() {
    let config = config_from(&[("RECENT_NOTES_RELAYS", " , ")]).unwrap();
    assert!(config.relays.is_empty());
    assert!(config.sources().is_empty());
    assert!(config.require_sources().is_err());
}

#[test]
fn relay_list_drops_blanks_and_whitespace() {
    assert_eq!(
        parse_relay_list(" wss://a ,,wss://b,"),
        vec!["wss://a".to_string(), "wss://b".to_string()]
    );
}

#[test]
fn sources_follow_configured_order() {
    let config = config_from(&[("RECENT_NOTES_RELAYS", "wss://z,wss://a")]).unwrap();
    let addresses: Vec<String> = config.sources().into_iter().map(|s| s.address).collect();
    assert_eq!(addresses, vec!["wss://z", "wss://a"]);
    assert!(config.require_sources().is_ok());
}

#[test]
fn filter_asks_for_both_kinds() {
    let filter = Tunables::default().filter();
    assert_eq!(filter.kinds, vec![30397, 10390]);
    assert_eq!(filter.limit, 200);
}
