//! Observable presentation state
//!
//! A single `watch` channel holds the current [`DashboardState`]. Each write
//! is one `send_if_modified` call, so readers never see a half-applied update
//! and subscribers wake only on real changes.

use super::decode::{decode_message, DecodeError, FeedUpdate};
use super::types::{ConnectionStatus, DashboardState, FeedError, Snapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// What applying a payload did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Snapshot replaced with `assets` records
    Snapshot { assets: usize },
    /// Server error recorded; prices untouched
    ServerError(String),
}

/// Shared store for the latest feed state
#[derive(Debug, Clone)]
pub struct PriceStore {
    tx: Arc<watch::Sender<DashboardState>>,
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceStore {
    /// Create an empty store: no prices, disconnected, no error
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DashboardState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.tx.subscribe()
    }

    /// Copy of the full current state
    pub fn state(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    /// Current snapshot
    pub fn prices(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow().prices)
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        self.tx.borrow().status
    }

    /// Time of the last accepted snapshot
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.tx.borrow().last_update
    }

    /// Last unresolved error
    pub fn error(&self) -> Option<FeedError> {
        self.tx.borrow().error.clone()
    }

    /// Transport opened
    pub fn set_connected(&self) {
        self.tx.send_if_modified(|state| {
            let changed = state.status != ConnectionStatus::Connected || state.error.is_some();
            state.status = ConnectionStatus::Connected;
            state.error = None;
            changed
        });
    }

    /// Transport closed; prices stay visible
    pub fn set_disconnected(&self) {
        self.set_status(ConnectionStatus::Disconnected);
    }

    /// Transport reported an error event
    pub fn set_transport_error(&self) {
        self.tx.send_if_modified(|state| {
            let changed = state.status != ConnectionStatus::Error
                || state.error.as_ref() != Some(&FeedError::Transport);
            state.status = ConnectionStatus::Error;
            state.error = Some(FeedError::Transport);
            changed
        });
    }

    /// Record an error without touching the connection status
    pub fn set_error(&self, error: FeedError) {
        self.tx.send_if_modified(|state| {
            let changed = state.error.as_ref() != Some(&error);
            state.error = Some(error);
            changed
        });
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.tx.send_if_modified(|state| {
            let changed = state.status != status;
            state.status = status;
            changed
        });
    }

    /// Decode a raw payload and apply it
    ///
    /// On decode failure the decode error is recorded and prices, timestamp
    /// and connection status are left as they were.
    pub fn apply_message(&self, payload: &str) -> Result<ApplyOutcome, DecodeError> {
        match decode_message(payload) {
            Ok(update) => Ok(self.apply_update(update, Utc::now())),
            Err(e) => {
                self.set_error(FeedError::Decode);
                Err(e)
            }
        }
    }

    /// Apply an already decoded update; `received_at` stands in for a missing timestamp
    pub fn apply_update(&self, update: FeedUpdate, received_at: DateTime<Utc>) -> ApplyOutcome {
        match update {
            FeedUpdate::ServerError(message) => {
                self.set_error(FeedError::Server(message.clone()));
                ApplyOutcome::ServerError(message)
            }
            FeedUpdate::Snapshot { prices, timestamp } => {
                let assets = prices.len();
                let timestamp = timestamp.unwrap_or(received_at);
                self.tx.send_if_modified(|state| {
                    let last_update = match state.last_update {
                        Some(prev) if prev > timestamp => prev,
                        _ => timestamp,
                    };
                    let changed = *state.prices != prices
                        || state.last_update != Some(last_update)
                        || state.error.is_some();
                    if *state.prices != prices {
                        state.prices = Arc::new(prices);
                    }
                    state.last_update = Some(last_update);
                    state.error = None;
                    changed
                });
                ApplyOutcome::Snapshot { assets }
            }
        }
    }
}
