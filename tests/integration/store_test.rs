//! Integration tests for decoding payloads into the presentation store

use live_prices::display::{crypto_icon, format_change, format_price};
use live_prices::feed::{ConnectionStatus, FeedError, PriceStore};

const SCENARIO_A: &str = r#"{"prices":{"bitcoin":{"name":"Bitcoin","symbol":"BTC","price":50000.5,"change_24h":2.34}},"timestamp":"2024-01-01T00:00:00Z"}"#;

#[test]
fn test_snapshot_renders_formatted_values() {
    let store = PriceStore::new();
    store.apply_message(SCENARIO_A).unwrap();

    let prices = store.prices();
    assert_eq!(prices.len(), 1);
    let btc = &prices["bitcoin"];
    assert_eq!(btc.name, "Bitcoin");
    assert_eq!(btc.symbol, "BTC");
    assert_eq!(format_price(btc.price), "$50,000.50");
    assert_eq!(format_change(btc.change_24h), "+2.34%");
    assert_eq!(crypto_icon(&btc.id), "₿");
    assert_eq!(
        store.last_update().map(|t| t.to_rfc3339()),
        Some("2024-01-01T00:00:00+00:00".to_string())
    );
}

#[test]
fn test_server_error_leaves_snapshot() {
    let store = PriceStore::new();
    store.apply_message(SCENARIO_A).unwrap();
    let before = store.state();

    store.apply_message(r#"{"error":"rate limited"}"#).unwrap();

    let after = store.state();
    assert_eq!(after.error, Some(FeedError::Server("rate limited".to_string())));
    assert_eq!(after.error.map(|e| e.to_string()).as_deref(), Some("rate limited"));
    assert_eq!(after.prices, before.prices);
    assert_eq!(after.last_update, before.last_update);
}

#[test]
fn test_non_json_payload_leaves_state() {
    let store = PriceStore::new();
    store.apply_message(SCENARIO_A).unwrap();
    store.set_connected();
    let before = store.state();

    assert!(store.apply_message("not json").is_err());

    let after = store.state();
    assert_eq!(after.error, Some(FeedError::Decode));
    assert_eq!(after.status, ConnectionStatus::Connected);
    assert_eq!(after.prices, before.prices);
    assert_eq!(after.last_update, before.last_update);
}

#[test]
fn test_recovery_after_error() {
    let store = PriceStore::new();
    store.apply_message(r#"{"error":"Rate limited, no cached data available"}"#).unwrap();
    assert!(store.error().is_some());
    assert!(store.prices().is_empty());

    store.apply_message(SCENARIO_A).unwrap();
    assert!(store.error().is_none());
    assert_eq!(store.prices().len(), 1);
}

#[test]
fn test_repeated_snapshot_is_idempotent() {
    let once = PriceStore::new();
    once.apply_message(SCENARIO_A).unwrap();

    let twice = PriceStore::new();
    twice.apply_message(SCENARIO_A).unwrap();
    twice.apply_message(SCENARIO_A).unwrap();

    assert_eq!(once.state(), twice.state());
}

#[test]
fn test_cached_empty_payload_yields_empty_snapshot() {
    let store = PriceStore::new();
    store.apply_message(SCENARIO_A).unwrap();
    store.apply_message("{}").unwrap();
    assert!(store.prices().is_empty());
    assert!(store.last_update().is_some());
}
