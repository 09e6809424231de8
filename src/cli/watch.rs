//! Watch command implementation

use crate::config::Config;
use crate::display::render_dashboard;
use crate::feed::{LiveFeed, PriceFeed};
use clap::Args;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Print one JSON line per state change instead of the dashboard
    #[arg(long)]
    pub json: bool,

    /// Override the feed endpoint from the config file
    #[arg(long)]
    pub url: Option<String>,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut ws_config = config.feed.ws_config()?;
        if let Some(url) = &self.url {
            ws_config.url = url.clone();
        }

        let feed = LiveFeed::new(ws_config);
        let mut updates = feed.subscribe();
        feed.start();

        loop {
            {
                let state = updates.borrow_and_update();
                if self.json {
                    println!("{}", serde_json::to_string(&*state)?);
                } else {
                    println!(
                        "{}",
                        render_dashboard(&state, config.feed.expected_update_interval_secs)
                    );
                }
            }

            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        tracing::warn!("Feed state channel closed");
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, shutting down");
                    break;
                }
            }
        }

        feed.shutdown();
        Ok(())
    }
}
