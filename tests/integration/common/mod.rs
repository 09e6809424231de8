//! In-memory connector for driving the live feed without a network
#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use live_prices::ws::{Connector, TransportEvent, TransportStream, WsError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Records every connection attempt and hands the test a sender per session
#[derive(Default)]
pub struct MockConnector {
    attempts: AtomicUsize,
    sessions: Mutex<Vec<mpsc::UnboundedSender<TransportEvent>>>,
    failure: Mutex<Option<WsError>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of connect calls so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make every following connect fail with `error`
    pub fn fail_with(&self, error: WsError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Let connects succeed again
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Push an event into the most recent session
    pub fn push(&self, event: TransportEvent) {
        let sessions = self.sessions.lock().unwrap();
        let latest = sessions.last().expect("no session opened");
        let _ = latest.send(event);
    }

    pub fn push_text(&self, text: &str) {
        self.push(TransportEvent::Text(text.to_string()));
    }

    /// Peer sends a close frame
    pub fn close(&self, code: u16, reason: &str) {
        self.push(TransportEvent::Closed {
            code: Some(code),
            reason: reason.to_string(),
        });
    }

    /// Whether the client has dropped the most recent session's transport
    pub fn latest_dropped(&self) -> bool {
        self.sessions
            .lock()
            .unwrap()
            .last()
            .map(|tx| tx.is_closed())
            .unwrap_or(true)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _url: &str) -> Result<TransportStream, WsError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.lock().unwrap().push(tx);
        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed())
    }
}

/// Let spawned tasks drain their queues
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
