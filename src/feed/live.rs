//! Live feed client: keeps the price store in sync with the feed endpoint

use super::store::{ApplyOutcome, PriceStore};
use super::types::{DashboardState, FeedError};
use super::PriceFeed;
use crate::telemetry::{self, FeedCounter};
use crate::ws::{Connector, TungsteniteConnector, WsClient, WsConfig, WsControl, WsMessage};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default feed endpoint
pub const DEFAULT_FEED_URL: &str = "wss://tellprice-telegram-bot.onrender.com/ws/crypto-prices";

/// Running connection plus the task feeding the store
struct Session {
    control: WsControl,
    task: JoinHandle<()>,
}

/// Streaming price client with automatic reconnection
///
/// Owns at most one connection loop. Dropping the client closes the
/// transport and stops any scheduled reconnection.
pub struct LiveFeed {
    client: WsClient,
    store: PriceStore,
    session: Mutex<Option<Session>>,
}

impl LiveFeed {
    /// Create a client for the given endpoint configuration
    pub fn new(config: WsConfig) -> Self {
        Self::with_connector(config, Arc::new(TungsteniteConnector))
    }

    /// Create a client for the default endpoint
    pub fn with_default_url() -> Self {
        Self::new(WsConfig::new(DEFAULT_FEED_URL))
    }

    /// Create a client that opens transports through `connector`
    pub fn with_connector(config: WsConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            client: WsClient::with_connector(config, connector),
            store: PriceStore::new(),
            session: Mutex::new(None),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        self.client.url()
    }

    /// The presentation state store
    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    /// Start the connection loop; no-op while one is already running
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.as_ref().is_some_and(|s| !s.task.is_finished()) {
            tracing::debug!("Live feed already running");
            return;
        }

        tracing::info!(url = %self.client.url(), "Starting live feed");
        let (ws_rx, control) = self.client.connect();
        let store = self.store.clone();
        let task = tokio::spawn(async move {
            Self::run_message_loop(ws_rx, store).await;
        });
        *session = Some(Session { control, task });
    }

    /// Reconnect now, replacing the current connection or a pending retry
    pub fn reconnect(&self) {
        let running = {
            let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            match session.as_ref() {
                Some(s) if !s.task.is_finished() => match s.control.reconnect() {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::debug!(error = %e, "Reconnect command not delivered, restarting");
                        false
                    }
                },
                _ => false,
            }
        };

        if !running {
            self.start();
        }
    }

    /// Close the transport and stop reconnecting
    pub fn shutdown(&self) {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = session {
            tracing::info!("Shutting down live feed");
            session.control.shutdown();
            session.task.abort();
            self.store.set_disconnected();
            telemetry::set_connected(false);
        }
    }

    /// Whether a connection loop is running
    pub fn is_running(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    /// Apply connection events and payloads to the store in arrival order
    async fn run_message_loop(mut ws_rx: mpsc::Receiver<WsMessage>, store: PriceStore) {
        while let Some(msg) = ws_rx.recv().await {
            match msg {
                WsMessage::Connected => {
                    tracing::info!("Live feed connected");
                    store.set_connected();
                    telemetry::set_connected(true);
                }
                WsMessage::Text(text) => {
                    telemetry::increment(FeedCounter::MessagesReceived);
                    match store.apply_message(&text) {
                        Ok(ApplyOutcome::Snapshot { assets }) => {
                            telemetry::increment(FeedCounter::SnapshotsApplied);
                            tracing::debug!(assets, "Applied price snapshot");
                        }
                        Ok(ApplyOutcome::ServerError(message)) => {
                            telemetry::increment(FeedCounter::ServerErrors);
                            tracing::warn!(error = %message, "Feed reported an error");
                        }
                        Err(e) => {
                            telemetry::increment(FeedCounter::DecodeFailures);
                            tracing::warn!(
                                error = %e,
                                msg_preview = %text.chars().take(100).collect::<String>(),
                                "Failed to parse price message"
                            );
                        }
                    }
                }
                WsMessage::Error(e) => {
                    tracing::warn!(error = %e, "Live feed transport error");
                    store.set_transport_error();
                }
                WsMessage::ConnectFailed(e) => {
                    tracing::error!(error = %e, "Live feed could not connect");
                    store.set_error(FeedError::ConnectFailed);
                }
                WsMessage::Disconnected { code, reason } => {
                    tracing::info!(?code, reason = %reason, "Live feed disconnected");
                    store.set_disconnected();
                    telemetry::set_connected(false);
                }
                WsMessage::Reconnecting { attempt, delay } => {
                    telemetry::increment(FeedCounter::ReconnectAttempts);
                    tracing::info!(
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        "Live feed reconnecting"
                    );
                }
            }
        }
    }
}

impl PriceFeed for LiveFeed {
    fn start(&self) {
        LiveFeed::start(self);
    }

    fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.store.subscribe()
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}
