//! Price feed module
//!
//! Streams price snapshots from the feed endpoint into an observable store

mod decode;
mod live;
mod store;
mod types;

pub use decode::{decode_message, DecodeError, FeedUpdate};
pub use live::{LiveFeed, DEFAULT_FEED_URL};
pub use store::{ApplyOutcome, PriceStore};
pub use types::{ConnectionStatus, DashboardState, FeedError, PriceRecord, Snapshot};

use tokio::sync::watch;

/// Trait for price feed implementations
pub trait PriceFeed: Send + Sync {
    /// Begin streaming; repeated calls are no-ops
    fn start(&self);

    /// Subscribe to state changes
    fn subscribe(&self) -> watch::Receiver<DashboardState>;
}
