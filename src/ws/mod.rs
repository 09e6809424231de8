//! WebSocket client library
//!
//! Provides a WebSocket client that owns one transport at a time and
//! reconnects after every close, with a pluggable [`Connector`] seam.

mod client;
mod connector;
mod types;

pub use client::{WsClient, WsControl};
pub use connector::{Connector, TungsteniteConnector};
pub use types::{TransportEvent, TransportStream, WsConfig, WsError, WsMessage};
