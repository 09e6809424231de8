//! WebSocket client with automatic reconnection

use super::connector::{Connector, TungsteniteConnector};
use super::types::{TransportEvent, WsConfig, WsError, WsMessage};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Commands accepted by a running connection loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Reconnect,
}

/// How one connection session ended
enum SessionEnd {
    /// Transport closed or failed to open; `opened` tells whether it was ever up
    Closed { opened: bool },
    /// URL rejected before any I/O; only a manual reconnect retries
    InvalidUrl,
    /// Manual reconnect requested while connected
    Reconnect,
    /// Consumer or controller went away
    Stop,
}

/// Handle for steering a connection loop started by [`WsClient::connect`]
///
/// Dropping every clone stops the loop, as does [`WsControl::shutdown`].
#[derive(Debug, Clone)]
pub struct WsControl {
    commands: mpsc::Sender<Command>,
    shutdown: CancellationToken,
}

impl WsControl {
    /// Request an immediate reconnect, cancelling any pending scheduled attempt
    ///
    /// A full command queue already holds a reconnect, so that counts as success.
    pub fn reconnect(&self) -> Result<(), WsError> {
        match self.commands.try_send(Command::Reconnect) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::debug!("Reconnect already pending");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(WsError::ChannelClosed),
        }
    }

    /// Stop the loop and close the transport
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Whether shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

/// Reusable WebSocket client with automatic reconnection
pub struct WsClient {
    config: WsConfig,
    connector: Arc<dyn Connector>,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self::with_connector(config, Arc::new(TungsteniteConnector))
    }

    /// Create a client that opens transports through `connector`
    pub fn with_connector(config: WsConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Get the configuration
    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Connect and return a receiver for messages plus a control handle
    ///
    /// This spawns a background task that owns the transport. After every
    /// close it schedules exactly one reconnection after the configured
    /// delay. A manual reconnect during that wait replaces the scheduled one.
    pub fn connect(&self) -> (mpsc::Receiver<WsMessage>, WsControl) {
        let (tx, rx) = mpsc::channel(1024);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let config = self.config.clone();
        let connector = Arc::clone(&self.connector);
        let token = shutdown.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("WebSocket loop cancelled");
                }
                _ = Self::run_connection_loop(config, connector, tx, cmd_rx) => {}
            }
        });

        let control = WsControl {
            commands: cmd_tx,
            shutdown,
        };
        (rx, control)
    }

    /// Run the connection loop with automatic reconnection
    async fn run_connection_loop(
        config: WsConfig,
        connector: Arc<dyn Connector>,
        tx: mpsc::Sender<WsMessage>,
        mut commands: mpsc::Receiver<Command>,
    ) {
        let mut reconnect_attempts: u32 = 0;

        loop {
            match Self::connect_and_stream(&config, connector.as_ref(), &tx, &mut commands).await
            {
                SessionEnd::Stop => break,
                SessionEnd::Reconnect => {
                    reconnect_attempts = 0;
                    continue;
                }
                SessionEnd::InvalidUrl => {
                    if Self::wait_for_command(&mut commands).await {
                        reconnect_attempts = 0;
                        continue;
                    }
                    break;
                }
                SessionEnd::Closed { opened } => {
                    if opened {
                        reconnect_attempts = 0;
                    }
                }
            }

            if tx.is_closed() {
                tracing::info!("Receiver dropped, stopping reconnection");
                break;
            }

            reconnect_attempts += 1;
            if !config.allows_attempt(reconnect_attempts) {
                tracing::error!(
                    max = config.max_reconnect_attempts,
                    "Max reconnection attempts reached, waiting for manual reconnect"
                );
                if Self::wait_for_command(&mut commands).await {
                    reconnect_attempts = 0;
                    continue;
                }
                break;
            }

            let delay = config.delay_for_attempt(reconnect_attempts);
            tracing::info!(
                attempt = reconnect_attempts,
                delay_ms = delay.as_millis() as u64,
                "Scheduling reconnection"
            );
            if tx
                .send(WsMessage::Reconnecting {
                    attempt: reconnect_attempts,
                    delay,
                })
                .await
                .is_err()
            {
                break;
            }

            tokio::select! {
                _ = sleep(delay) => {}
                cmd = commands.recv() => match cmd {
                    Some(Command::Reconnect) => {
                        tracing::info!("Manual reconnect, dropping scheduled attempt");
                        reconnect_attempts = 0;
                    }
                    None => break,
                }
            }
        }
    }

    /// Block until a reconnect command arrives; false if the controller is gone
    async fn wait_for_command(commands: &mut mpsc::Receiver<Command>) -> bool {
        matches!(commands.recv().await, Some(Command::Reconnect))
    }

    /// Connect to WebSocket and stream messages until the transport ends
    async fn connect_and_stream(
        config: &WsConfig,
        connector: &dyn Connector,
        tx: &mpsc::Sender<WsMessage>,
        commands: &mut mpsc::Receiver<Command>,
    ) -> SessionEnd {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let mut stream = match connector.connect(&config.url).await {
            Ok(stream) => stream,
            Err(WsError::InvalidUrl(e)) => {
                tracing::error!(url = %config.url, error = %e, "Failed to create WebSocket");
                if tx.send(WsMessage::ConnectFailed(e)).await.is_err() {
                    return SessionEnd::Stop;
                }
                return SessionEnd::InvalidUrl;
            }
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket connection error");
                let reason = e.to_string();
                if tx.send(WsMessage::Error(reason.clone())).await.is_err()
                    || tx
                        .send(WsMessage::Disconnected { code: None, reason })
                        .await
                        .is_err()
                {
                    return SessionEnd::Stop;
                }
                return SessionEnd::Closed { opened: false };
            }
        };

        tracing::info!("WebSocket connected");

        if tx.send(WsMessage::Connected).await.is_err() {
            return SessionEnd::Stop;
        }

        loop {
            tokio::select! {
                event = stream.next() => {
                    let msg = match event {
                        Some(TransportEvent::Text(text)) => WsMessage::Text(text),
                        Some(TransportEvent::Error(e)) => {
                            tracing::warn!(error = %e, "WebSocket transport error");
                            WsMessage::Error(e)
                        }
                        Some(TransportEvent::Closed { code, reason }) => {
                            tracing::info!(?code, reason = %reason, "WebSocket disconnected");
                            let _ = tx.send(WsMessage::Disconnected { code, reason }).await;
                            return SessionEnd::Closed { opened: true };
                        }
                        None => {
                            tracing::info!("WebSocket stream ended");
                            let _ = tx
                                .send(WsMessage::Disconnected {
                                    code: Some(1006),
                                    reason: "stream ended".to_string(),
                                })
                                .await;
                            return SessionEnd::Closed { opened: true };
                        }
                    };

                    if tx.send(msg).await.is_err() {
                        tracing::debug!("Receiver dropped, closing connection");
                        return SessionEnd::Stop;
                    }
                }

                cmd = commands.recv() => match cmd {
                    Some(Command::Reconnect) => {
                        tracing::info!("Manual reconnect requested, closing current connection");
                        drop(stream);
                        if tx
                            .send(WsMessage::Disconnected {
                                code: Some(1000),
                                reason: "manual reconnect".to_string(),
                            })
                            .await
                            .is_err()
                        {
                            return SessionEnd::Stop;
                        }
                        return SessionEnd::Reconnect;
                    }
                    None => return SessionEnd::Stop,
                }
            }
        }
    }
}
