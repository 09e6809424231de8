//! live-prices: streaming client for a live cryptocurrency price feed
//!
//! This library provides:
//! - A WebSocket transport that reconnects after every close
//! - Decoding of feed payloads into price snapshots
//! - An observable store holding prices, connection status and last error
//! - Formatting helpers and a plain-text dashboard renderer
//! - Logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod display;
pub mod feed;
pub mod telemetry;
pub mod ws;
