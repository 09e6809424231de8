//! Integration tests for the live feed connection lifecycle

mod common;

use common::{settle, MockConnector};
use live_prices::feed::{ConnectionStatus, FeedError, LiveFeed};
use live_prices::ws::{TransportEvent, WsConfig, WsError};
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::time::sleep;

const BTC_MSG: &str = r#"{"prices":{"bitcoin":{"name":"Bitcoin","symbol":"BTC","price":50000.5,"change_24h":2.34}},"timestamp":"2024-01-01T00:00:00Z"}"#;

fn feed_with(mock: &std::sync::Arc<MockConnector>) -> LiveFeed {
    LiveFeed::with_connector(WsConfig::new("wss://feed.test/ws"), mock.clone())
}

#[tokio::test(start_paused = true)]
async fn test_connect_and_receive_prices() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;

    assert_eq!(mock.attempts(), 1);
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);

    mock.push_text(BTC_MSG);
    settle().await;

    let prices = feed.store().prices();
    assert_eq!(prices["bitcoin"].price, dec!(50000.5));
    assert!(feed.store().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_once_after_fixed_delay() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;
    mock.push_text(BTC_MSG);
    settle().await;

    mock.close(1000, "bye");
    settle().await;
    assert_eq!(feed.store().status(), ConnectionStatus::Disconnected);
    assert_eq!(feed.store().prices().len(), 1, "last prices stay visible");
    assert_eq!(mock.attempts(), 1);

    sleep(Duration::from_millis(4_900)).await;
    assert_eq!(mock.attempts(), 1);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(mock.attempts(), 2);
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(mock.attempts(), 2, "no further attempts while connected");
}

#[tokio::test(start_paused = true)]
async fn test_stream_end_triggers_reconnect() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;

    mock.push(TransportEvent::Error("connection reset".to_string()));
    settle().await;
    assert_eq!(feed.store().status(), ConnectionStatus::Error);
    assert_eq!(feed.store().error(), Some(FeedError::Transport));

    mock.close(1006, "abnormal");
    settle().await;
    assert_eq!(feed.store().status(), ConnectionStatus::Disconnected);
    assert_eq!(feed.store().error(), Some(FeedError::Transport));

    sleep(Duration::from_secs(5)).await;
    assert_eq!(mock.attempts(), 2);
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);
    assert!(feed.store().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_manual_reconnect_cancels_scheduled_attempt() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;

    mock.close(1001, "going away");
    settle().await;
    sleep(Duration::from_secs(2)).await;

    feed.reconnect();
    settle().await;
    assert_eq!(mock.attempts(), 2);
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(mock.attempts(), 2, "stale scheduled attempt must not fire");
}

#[tokio::test(start_paused = true)]
async fn test_manual_reconnect_while_connected_replaces_transport() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;

    feed.reconnect();
    settle().await;
    assert_eq!(mock.attempts(), 2);
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(mock.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_handshake_failure_retries_forever() {
    let mock = MockConnector::new();
    mock.fail_with(WsError::ConnectionFailed("refused".to_string()));
    let feed = feed_with(&mock);
    feed.start();
    settle().await;

    assert_eq!(feed.store().status(), ConnectionStatus::Disconnected);
    assert_eq!(feed.store().error(), Some(FeedError::Transport));

    sleep(Duration::from_secs(5 * 20)).await;
    assert_eq!(mock.attempts(), 21);

    mock.recover();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_url_waits_for_manual_reconnect() {
    let mock = MockConnector::new();
    mock.fail_with(WsError::InvalidUrl("no host".to_string()));
    let feed = feed_with(&mock);
    feed.start();
    settle().await;

    assert_eq!(feed.store().error(), Some(FeedError::ConnectFailed));
    assert_eq!(feed.store().status(), ConnectionStatus::Disconnected);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.attempts(), 1);

    mock.recover();
    feed.reconnect();
    settle().await;
    assert_eq!(mock.attempts(), 2);
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);
    assert!(feed.store().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_max_reconnect_attempts() {
    let mock = MockConnector::new();
    mock.fail_with(WsError::ConnectionFailed("refused".to_string()));
    let feed = LiveFeed::with_connector(
        WsConfig::new("wss://feed.test/ws").max_reconnects(2),
        mock.clone(),
    );
    feed.start();

    sleep(Duration::from_secs(120)).await;
    assert_eq!(mock.attempts(), 3);
    assert!(feed.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_transport_and_stops_retries() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;
    assert!(!mock.latest_dropped());

    feed.shutdown();
    settle().await;
    assert!(mock.latest_dropped());

    sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_marks_store_disconnected() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;
    mock.push_text(BTC_MSG);
    settle().await;
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);

    feed.shutdown();
    settle().await;
    assert!(mock.latest_dropped());
    assert!(!feed.is_running());
    assert_eq!(feed.store().status(), ConnectionStatus::Disconnected);
    assert_eq!(feed.store().prices().len(), 1, "last prices stay visible");

    feed.start();
    settle().await;
    assert_eq!(mock.attempts(), 2);
    assert_eq!(feed.store().status(), ConnectionStatus::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_drop_closes_transport() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;

    mock.close(1000, "bye");
    settle().await;
    drop(feed);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.attempts(), 1, "scheduled reconnect must not outlive the client");
}

#[tokio::test(start_paused = true)]
async fn test_decode_failure_keeps_connection() {
    let mock = MockConnector::new();
    let feed = feed_with(&mock);
    feed.start();
    settle().await;
    mock.push_text(BTC_MSG);
    mock.push_text("not json");
    settle().await;

    assert_eq!(feed.store().status(), ConnectionStatus::Connected);
    assert_eq!(feed.store().error(), Some(FeedError::Decode));
    assert_eq!(feed.store().prices().len(), 1);
    assert!(!mock.latest_dropped());
}
