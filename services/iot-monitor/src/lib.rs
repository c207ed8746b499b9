//! IoT Monitor - live environmental sensor dashboard
//!
//! Subscribes to sensor topics on an MQTT broker over WebSocket, keeps the
//! latest reading per sensor, and serves it as a web dashboard.

pub mod broker;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod layout;
pub mod reading;
pub mod sensor;
pub mod state;
pub mod subscriber;
pub mod topics;

pub use config::{load_config, Config};
pub use error::{MonitorError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::broker::MqttSession;
use crate::dashboard::DashboardOptions;
use crate::subscriber::Subscriber;
use crate::topics::TopicTable;

/// Run the IoT monitor with the given configuration until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    run_until_cancelled(config, cancel).await
}

/// Run the IoT monitor until `cancel` is triggered.
///
/// Configuration problems (topic table, broker URL, QoS) are reported before
/// anything connects.
pub async fn run_until_cancelled(config: Config, cancel: CancellationToken) -> Result<()> {
    let table = Arc::new(TopicTable::new(&config.topics)?);
    let session = MqttSession::new(&config.broker, table.len())?;
    let state = state::new_state_handle(config.broker.url.clone());

    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let router = dashboard::build_router(
            Arc::clone(&state),
            DashboardOptions::from(&config.dashboard),
        );
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };
            tracing::info!("Dashboard listening on http://{}", addr);

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Dashboard stopped");
        });
    }

    tracing::info!(
        "Connecting to {} for {} topics",
        config.broker.url,
        table.len()
    );

    Subscriber::new(Box::new(session), table, state)
        .run(cancel)
        .await;

    Ok(())
}
