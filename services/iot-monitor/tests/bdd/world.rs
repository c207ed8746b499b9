//! BDD test world for the IoT monitor

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cucumber::World;
use iot_monitor::broker::{BrokerEvent, BrokerSession};
use iot_monitor::reading::{ApplyOutcome, ReadingState};
use iot_monitor::state::StateHandle;
use iot_monitor::topics::TopicTable;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, World)]
pub struct MonitorWorld {
    // Reducer testing
    pub table: Option<TopicTable>,
    pub table_error: Option<String>,
    pub reading_state: Option<ReadingState>,
    pub previous_state: Option<ReadingState>,
    pub last_outcome: Option<ApplyOutcome>,

    // Subscriber testing
    pub broker_events: Vec<BrokerEvent>,
    pub subscriptions: Option<Arc<StdMutex<Vec<String>>>>,
    pub disconnects: Option<Arc<StdMutex<u32>>>,
    pub shared_state: Option<StateHandle>,

    // Dashboard testing
    pub response_body: Option<String>,
}

impl MonitorWorld {
    pub fn table(&self) -> TopicTable {
        self.table.clone().unwrap_or_default()
    }

    pub fn reading_state(&self) -> &ReadingState {
        self.reading_state.as_ref().expect("reading state not set")
    }
}

/// Broker session that replays scripted events, then cancels the run loop
pub struct ScriptedSession {
    events: VecDeque<BrokerEvent>,
    cancel: CancellationToken,
    subscriptions: Arc<StdMutex<Vec<String>>>,
    disconnects: Arc<StdMutex<u32>>,
}

impl ScriptedSession {
    pub fn new(
        events: Vec<BrokerEvent>,
        cancel: CancellationToken,
        subscriptions: Arc<StdMutex<Vec<String>>>,
        disconnects: Arc<StdMutex<u32>>,
    ) -> Self {
        Self {
            events: events.into(),
            cancel,
            subscriptions,
            disconnects,
        }
    }
}

#[async_trait]
impl BrokerSession for ScriptedSession {
    async fn subscribe(&mut self, topic: &str) -> iot_monitor::Result<()> {
        self.subscriptions.lock().unwrap().push(topic.to_string());
        Ok(())
    }

    async fn next_event(&mut self) -> BrokerEvent {
        match self.events.pop_front() {
            Some(event) => event,
            None => {
                self.cancel.cancel();
                std::future::pending().await
            }
        }
    }

    async fn disconnect(&mut self) -> iot_monitor::Result<()> {
        *self.disconnects.lock().unwrap() += 1;
        Ok(())
    }
}
