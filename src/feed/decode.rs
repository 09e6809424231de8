//! Decoding of feed payloads
//!
//! Payload shape:
//! `{"prices": {"<id>": {"name", "symbol", "price", "change_24h"}}, "timestamp": .., "error"?: ..}`

use super::types::{PriceRecord, Snapshot};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of decoding one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    /// New full price snapshot. `timestamp` is `None` when the payload had none.
    Snapshot {
        prices: Snapshot,
        timestamp: Option<DateTime<Utc>>,
    },
    /// Server-reported error; prices and timestamp were ignored
    ServerError(String),
}

/// Payload could not be turned into a [`FeedUpdate`]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}

#[derive(Debug, Deserialize)]
struct WireSnapshot {
    prices: Option<BTreeMap<String, WireRecord>>,
    timestamp: Option<WireTimestamp>,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    name: String,
    symbol: String,
    price: Decimal,
    change_24h: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    /// Epoch milliseconds
    Epoch(f64),
    Text(String),
}

/// Decode one raw text payload
pub fn decode_message(payload: &str) -> Result<FeedUpdate, DecodeError> {
    let value: Value = serde_json::from_str(payload)?;
    let Value::Object(ref fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    if let Some(message) = fields.get("error").and_then(server_error) {
        return Ok(FeedUpdate::ServerError(message));
    }

    let wire: WireSnapshot = serde_json::from_value(value)?;
    let timestamp = wire.timestamp.map(parse_timestamp).transpose()?;
    let prices = wire
        .prices
        .unwrap_or_default()
        .into_iter()
        .map(|(id, record)| {
            let record = PriceRecord {
                id: id.clone(),
                name: record.name,
                symbol: record.symbol,
                price: record.price,
                change_24h: record.change_24h,
            };
            (id, record)
        })
        .collect();

    Ok(FeedUpdate::Snapshot { prices, timestamp })
}

/// Falsy values (`null`, `false`, `0`, `""`) count as no error
fn server_error(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_timestamp(raw: WireTimestamp) -> Result<DateTime<Utc>, DecodeError> {
    match raw {
        WireTimestamp::Epoch(millis) => {
            if !millis.is_finite() {
                return Err(DecodeError::Timestamp(millis.to_string()));
            }
            Utc.timestamp_millis_opt(millis as i64)
                .single()
                .ok_or_else(|| DecodeError::Timestamp(millis.to_string()))
        }
        WireTimestamp::Text(text) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(&text) {
                return Ok(ts.with_timezone(&Utc));
            }
            // Feed server emits naive local ISO-8601; read it as UTC.
            text.parse::<NaiveDateTime>()
                .map(|naive| naive.and_utc())
                .map_err(|_| DecodeError::Timestamp(text))
        }
    }
}
