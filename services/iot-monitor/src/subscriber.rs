//! Telemetry subscriber: routes broker events into the reading state

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

use crate::broker::{BrokerEvent, BrokerSession};
use crate::state::StateHandle;
use crate::topics::TopicTable;

/// Owns the broker session and is the only writer of the shared state
pub struct Subscriber {
    session: Box<dyn BrokerSession>,
    table: Arc<TopicTable>,
    state: StateHandle,
}

impl Subscriber {
    pub fn new(session: Box<dyn BrokerSession>, table: Arc<TopicTable>, state: StateHandle) -> Self {
        Self {
            session,
            table,
            state,
        }
    }

    /// Subscribe every topic in the table once. Returns how many succeeded.
    pub async fn subscribe_all(&mut self) -> usize {
        let mut subscribed = 0;
        for (key, topic) in self.table.topics() {
            match self.session.subscribe(topic).await {
                Ok(()) => {
                    tracing::debug!("Subscribed '{}' -> {}", topic, key);
                    subscribed += 1;
                }
                Err(e) => tracing::warn!("Failed to subscribe '{}': {}", topic, e),
            }
        }
        subscribed
    }

    /// Process a single broker event
    pub async fn handle_event(&mut self, event: BrokerEvent) {
        match event {
            BrokerEvent::Connected => {
                tracing::info!(
                    "Connected to broker, subscribing to {} topics",
                    self.table.len()
                );
                let subscribed = self.subscribe_all().await;
                self.state.write().await.record_connected(subscribed);
            }
            BrokerEvent::Message { topic, payload } => {
                let now_ms = current_epoch_ms();
                let raw = match String::from_utf8(payload) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!("Dropping non-UTF-8 payload on '{}': {}", topic, e);
                        self.state.write().await.record_undecodable(now_ms);
                        return;
                    }
                };

                let current = self.state.read().await.snapshot();
                let applied = current.apply(&self.table, &topic, &raw);
                self.state.write().await.publish(applied, now_ms);
            }
            BrokerEvent::Error(e) => {
                tracing::warn!("Broker connection error: {}", e);
                self.state.write().await.record_connection_error();
            }
        }
    }

    /// Process events in delivery order until cancelled, then disconnect.
    ///
    /// The disconnect happens on every exit path, whatever state the
    /// connection is in.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("Telemetry subscriber started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = self.session.next_event() => self.handle_event(event).await,
            }
        }

        tracing::debug!("Telemetry subscriber cancelled, disconnecting");
        if let Err(e) = self.session.disconnect().await {
            tracing::warn!("Failed to disconnect from broker: {}", e);
        }
        self.state.write().await.record_disconnected();
        tracing::info!("Telemetry subscriber stopped");
    }
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
