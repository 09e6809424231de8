use clap::Parser;
use live_prices::cli::{Cli, Commands};
use live_prices::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using bundled example configuration");
        Config::example().unwrap_or_else(|e| {
            eprintln!("Warning: Bundled example config is invalid: {}", e);
            Config::default()
        })
    });

    let _telemetry = live_prices::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Watch(args) => {
            tracing::info!(url = %config.feed.url, "Starting live price dashboard");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {}", config.feed.url);
            println!(
                "  Reconnect: delay={}s, max_attempts={}, backoff={}x (cap {}s)",
                config.feed.reconnect_delay_secs,
                config.feed.max_reconnect_attempts,
                config.feed.backoff_multiplier,
                config.feed.max_reconnect_delay_secs
            );
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
