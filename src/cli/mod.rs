//! CLI interface for live-prices
//!
//! Provides subcommands for:
//! - `watch`: Stream live prices and render the dashboard
//! - `config`: Show the effective configuration

mod watch;

pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "live-prices")]
#[command(about = "Live cryptocurrency price dashboard over a resilient WebSocket feed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream prices and render every change
    Watch(WatchArgs),
    /// Show configuration
    Config,
}
