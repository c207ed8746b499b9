//! IoT Monitor CLI
//!
//! Command-line interface for the live MQTT sensor dashboard.

use std::path::PathBuf;

use clap::Parser;
use iot_monitor::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "iot-monitor")]
#[command(about = "Live MQTT environmental sensor dashboard")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker WebSocket URL (overrides config file)
    #[arg(long)]
    broker_url: Option<String>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, broker_url={:?}, dashboard_port={:?}, log_level={:?}",
        args.config,
        args.broker_url,
        args.dashboard_port,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(broker_url) = args.broker_url {
        config.broker.url = broker_url;
    }
    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }

    tracing::info!("Starting IoT monitor");
    tracing::debug!(
        "Broker: {}, topic overrides: {}, dashboard enabled: {}",
        config.broker.url,
        config.topics.len(),
        config.dashboard.enabled
    );

    iot_monitor::run(config).await?;

    Ok(())
}
