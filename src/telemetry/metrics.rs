//! Prometheus metrics

use std::net::SocketAddr;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum FeedCounter {
    /// Text frames received from the feed
    MessagesReceived,
    /// Snapshots accepted into the store
    SnapshotsApplied,
    /// Payloads that failed to decode
    DecodeFailures,
    /// Payloads carrying a server-reported error
    ServerErrors,
    /// Reconnections scheduled
    ReconnectAttempts,
}

impl FeedCounter {
    fn name(self) -> &'static str {
        match self {
            FeedCounter::MessagesReceived => "livefeed_messages_total",
            FeedCounter::SnapshotsApplied => "livefeed_snapshots_total",
            FeedCounter::DecodeFailures => "livefeed_decode_failures_total",
            FeedCounter::ServerErrors => "livefeed_server_errors_total",
            FeedCounter::ReconnectAttempts => "livefeed_reconnect_attempts_total",
        }
    }
}

/// Increment a counter by one
pub fn increment(counter: FeedCounter) {
    metrics::counter!(counter.name()).increment(1);
}

/// Record whether the feed transport is currently open
pub fn set_connected(connected: bool) {
    metrics::gauge!("livefeed_connected").set(if connected { 1.0 } else { 0.0 });
}

/// Serve metrics in Prometheus text format on `port`
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
