//! BDD step definitions for the telemetry subscriber

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use cucumber::{given, then, when};
use iot_monitor::broker::BrokerEvent;
use iot_monitor::sensor::SensorKey;
use iot_monitor::state::{new_state_handle, ConnectionStatus};
use iot_monitor::subscriber::Subscriber;
use tokio_util::sync::CancellationToken;

use crate::world::{MonitorWorld, ScriptedSession};

#[given("a broker that accepts the connection")]
fn broker_connects(world: &mut MonitorWorld) {
    world.broker_events.push(BrokerEvent::Connected);
}

#[given(expr = "a broker that reports the error {string}")]
fn broker_error(world: &mut MonitorWorld, error: String) {
    world.broker_events.push(BrokerEvent::Error(error));
}

#[given(expr = "the broker then delivers {string} on {string}")]
fn broker_delivers(world: &mut MonitorWorld, raw: String, topic: String) {
    world.broker_events.push(BrokerEvent::Message {
        topic,
        payload: raw.into_bytes(),
    });
}

#[given(expr = "the broker then delivers invalid UTF-8 on {string}")]
fn broker_delivers_binary(world: &mut MonitorWorld, topic: String) {
    world.broker_events.push(BrokerEvent::Message {
        topic,
        payload: vec![0xc3, 0x28],
    });
}

#[when("the subscriber runs until the broker goes quiet")]
async fn subscriber_runs(world: &mut MonitorWorld) {
    let cancel = CancellationToken::new();
    let subscriptions = Arc::new(StdMutex::new(Vec::new()));
    let disconnects = Arc::new(StdMutex::new(0));
    let session = ScriptedSession::new(
        std::mem::take(&mut world.broker_events),
        cancel.clone(),
        Arc::clone(&subscriptions),
        Arc::clone(&disconnects),
    );
    let state = new_state_handle("ws://localhost:9001/mqtt");

    Subscriber::new(Box::new(session), Arc::new(world.table()), Arc::clone(&state))
        .run(cancel)
        .await;

    world.subscriptions = Some(subscriptions);
    world.disconnects = Some(disconnects);
    world.shared_state = Some(state);
}

#[then(expr = "{int} subscriptions were requested")]
fn subscription_count(world: &mut MonitorWorld, expected: usize) {
    let subscriptions = world.subscriptions.as_ref().expect("subscriber did not run");
    assert_eq!(subscriptions.lock().unwrap().len(), expected);
}

#[then("every configured topic was subscribed exactly once")]
fn each_topic_once(world: &mut MonitorWorld) {
    let subscriptions = world.subscriptions.as_ref().expect("subscriber did not run");
    let subscriptions = subscriptions.lock().unwrap();
    let unique: HashSet<&String> = subscriptions.iter().collect();
    assert_eq!(unique.len(), subscriptions.len());

    let table = world.table();
    for (_, topic) in table.topics() {
        assert!(
            subscriptions.iter().any(|s| s == topic),
            "missing subscription for {}",
            topic
        );
    }
}

#[then("the broker connection was released")]
async fn connection_released(world: &mut MonitorWorld) {
    let disconnects = world.disconnects.as_ref().expect("subscriber did not run");
    assert_eq!(*disconnects.lock().unwrap(), 1);

    let state = world.shared_state.as_ref().expect("subscriber did not run");
    assert_eq!(state.read().await.connection, ConnectionStatus::Disconnected);
}

#[then(expr = "the shared reading {string} is {string}")]
async fn shared_reading(world: &mut MonitorWorld, key: String, expected: String) {
    let key: SensorKey = key.parse().expect("unknown sensor key");
    let state = world.shared_state.as_ref().expect("subscriber did not run");
    let snapshot = state.read().await.snapshot();
    assert_eq!(snapshot.value(key), Some(expected.as_str()));
}

#[then(expr = "{int} connection error(s) was/were recorded")]
async fn connection_errors(world: &mut MonitorWorld, expected: u64) {
    let state = world.shared_state.as_ref().expect("subscriber did not run");
    assert_eq!(state.read().await.stats.connection_errors, expected);
}

#[then(expr = "{int} undecodable payload(s) was/were recorded")]
async fn undecodable_payloads(world: &mut MonitorWorld, expected: u64) {
    let state = world.shared_state.as_ref().expect("subscriber did not run");
    assert_eq!(state.read().await.stats.undecodable_payloads, expected);
}
