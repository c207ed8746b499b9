//! Shared snapshot of readings, connection status and ingest counters

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::reading::{Applied, ApplyOutcome, ReadingState};

/// Connection status as last reported by the broker session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "Connecting"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Counters for everything the subscriber has seen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub messages_received: u64,
    pub readings_updated: u64,
    pub location_decode_failures: u64,
    pub unknown_topics: u64,
    pub undecodable_payloads: u64,
    pub connection_errors: u64,
    pub last_message_epoch_ms: Option<u64>,
}

/// State shared between the subscriber (sole writer) and the dashboard
#[derive(Debug)]
pub struct SharedState {
    pub readings: Arc<ReadingState>,
    pub connection: ConnectionStatus,
    pub stats: IngestStats,
    pub subscribed_topics: usize,
    pub broker_url: String,
    pub started_at: Instant,
}

impl SharedState {
    pub fn new(broker_url: impl Into<String>) -> Self {
        Self {
            readings: Arc::new(ReadingState::new()),
            connection: ConnectionStatus::Connecting,
            stats: IngestStats::default(),
            subscribed_topics: 0,
            broker_url: broker_url.into(),
            started_at: Instant::now(),
        }
    }

    /// Replace the reading snapshot with the reducer's result
    pub fn publish(&mut self, applied: Applied, now_ms: u64) {
        self.stats.messages_received += 1;
        self.stats.last_message_epoch_ms = Some(now_ms);
        match applied.outcome {
            ApplyOutcome::Updated(_) => {
                self.stats.readings_updated += 1;
                self.readings = Arc::new(applied.state);
            }
            ApplyOutcome::LocationRejected { .. } => self.stats.location_decode_failures += 1,
            ApplyOutcome::UnknownTopic => self.stats.unknown_topics += 1,
        }
    }

    /// Count a payload that never reached the reducer
    pub fn record_undecodable(&mut self, now_ms: u64) {
        self.stats.messages_received += 1;
        self.stats.undecodable_payloads += 1;
        self.stats.last_message_epoch_ms = Some(now_ms);
    }

    pub fn record_connected(&mut self, subscribed_topics: usize) {
        self.connection = ConnectionStatus::Connected;
        self.subscribed_topics = subscribed_topics;
    }

    pub fn record_connection_error(&mut self) {
        self.connection = ConnectionStatus::Disconnected;
        self.subscribed_topics = 0;
        self.stats.connection_errors += 1;
    }

    pub fn record_disconnected(&mut self) {
        self.connection = ConnectionStatus::Disconnected;
        self.subscribed_topics = 0;
    }

    /// Cheap handle to the current snapshot
    pub fn snapshot(&self) -> Arc<ReadingState> {
        Arc::clone(&self.readings)
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(broker_url: impl Into<String>) -> StateHandle {
    Arc::new(RwLock::new(SharedState::new(broker_url)))
}
