//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One tracked asset's latest price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Asset key (e.g., "bitcoin")
    pub id: String,
    /// Display name
    pub name: String,
    /// Ticker (e.g., "BTC")
    pub symbol: String,
    /// Price in USD
    pub price: Decimal,
    /// Signed percentage change over the trailing 24 hours
    pub change_24h: Decimal,
}

/// All known prices as of the last accepted update, keyed by asset id
pub type Snapshot = BTreeMap<String, PriceRecord>;

/// State of the transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
    Error,
}

impl ConnectionStatus {
    /// Lowercase status label
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last unresolved error shown to the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The connection could not be constructed
    #[error("Failed to connect to server")]
    ConnectFailed,
    /// The transport signalled an abnormal condition
    #[error("WebSocket connection error")]
    Transport,
    /// A payload could not be decoded
    #[error("Error parsing price data")]
    Decode,
    /// The server sent an application-level error
    #[error("{0}")]
    Server(String),
}

impl Serialize for FeedError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything the renderer needs, replaced field by field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardState {
    pub prices: Arc<Snapshot>,
    pub status: ConnectionStatus,
    pub last_update: Option<DateTime<Utc>>,
    pub error: Option<FeedError>,
}

impl DashboardState {
    /// True until the first snapshot with at least one asset arrives
    pub fn is_loading(&self) -> bool {
        self.prices.is_empty()
    }
}
