//! Transport seam between the reconnection loop and the socket library

use super::types::{TransportEvent, TransportStream, WsError};
use async_trait::async_trait;
use futures_util::{future, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

/// Opens transports to a feed endpoint
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Perform the handshake and return the stream of inbound events
    async fn connect(&self, url: &str) -> Result<TransportStream, WsError>;
}

/// Production connector backed by `tokio-tungstenite`
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<TransportStream, WsError> {
        let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
            tungstenite::Error::Url(e) => WsError::InvalidUrl(e.to_string()),
            tungstenite::Error::HttpFormat(e) => WsError::InvalidUrl(e.to_string()),
            e => WsError::ConnectionFailed(e.to_string()),
        })?;

        // Pings are answered by tungstenite while reading.
        let events = ws_stream.filter_map(|msg| future::ready(into_event(msg)));
        Ok(events.boxed())
    }
}

fn into_event(msg: Result<Message, tungstenite::Error>) -> Option<TransportEvent> {
    match msg {
        Ok(Message::Text(text)) => Some(TransportEvent::Text(text)),
        Ok(Message::Close(frame)) => Some(match frame {
            Some(frame) => TransportEvent::Closed {
                code: Some(u16::from(frame.code)),
                reason: frame.reason.into_owned(),
            },
            None => TransportEvent::Closed {
                code: None,
                reason: String::new(),
            },
        }),
        Ok(_) => None,
        Err(e) => Some(TransportEvent::Error(e.to_string())),
    }
}
