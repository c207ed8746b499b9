//! BDD step definitions for the reading state reducer

use std::collections::BTreeMap;

use cucumber::{given, then, when};
use iot_monitor::reading::{ApplyOutcome, Coordinates, ReadingState, PLACEHOLDER};
use iot_monitor::sensor::SensorKey;
use iot_monitor::topics::TopicTable;

use crate::world::MonitorWorld;

fn parse_key(s: &str) -> SensorKey {
    s.parse()
        .unwrap_or_else(|_| panic!("Unknown sensor key: {}", s))
}

#[given("a fresh reading state")]
fn fresh_state(world: &mut MonitorWorld) {
    world.reading_state = Some(ReadingState::new());
}

#[given(expr = "{string} is also configured to publish on {string}")]
fn topic_override(world: &mut MonitorWorld, key: String, topic: String) {
    let mut overrides = BTreeMap::new();
    overrides.insert(parse_key(&key), topic);
    match TopicTable::new(&overrides) {
        Ok(table) => world.table = Some(table),
        Err(e) => world.table_error = Some(e.to_string()),
    }
}

#[when(expr = "a message {string} arrives on {string}")]
fn message_arrives(world: &mut MonitorWorld, raw: String, topic: String) {
    let table = world.table();
    let current = world.reading_state().clone();
    let applied = current.apply(&table, &topic, &raw);
    world.previous_state = Some(current);
    world.reading_state = Some(applied.state);
    world.last_outcome = Some(applied.outcome);
}

#[then("every text reading shows the placeholder")]
fn all_placeholders(world: &mut MonitorWorld) {
    let state = world.reading_state();
    for key in SensorKey::ALL.into_iter().filter(|k| !k.is_location()) {
        assert_eq!(state.value(key), Some(PLACEHOLDER), "{}", key);
    }
}

#[then("the location is absent")]
fn location_absent(world: &mut MonitorWorld) {
    assert_eq!(world.reading_state().location(), None);
}

#[then(expr = "reading {string} is {string}")]
fn reading_is(world: &mut MonitorWorld, key: String, expected: String) {
    assert_eq!(
        world.reading_state().value(parse_key(&key)),
        Some(expected.as_str())
    );
}

#[then(expr = "only reading {string} changed")]
fn only_reading_changed(world: &mut MonitorWorld, key: String) {
    let changed_key = parse_key(&key);
    let previous = world.previous_state.as_ref().expect("no previous state");
    let current = world.reading_state();
    for key in SensorKey::ALL {
        if key == changed_key {
            continue;
        }
        if key.is_location() {
            assert_eq!(current.location(), previous.location());
        } else {
            assert_eq!(current.value(key), previous.value(key), "{}", key);
        }
    }
}

#[then(expr = "the location is latitude {float} and longitude {float}")]
fn location_is(world: &mut MonitorWorld, lat: f64, lon: f64) {
    assert_eq!(
        world.reading_state().location(),
        Some(Coordinates { lat, lon })
    );
}

#[then("a location decode failure is reported")]
fn decode_failure_reported(world: &mut MonitorWorld) {
    assert!(
        matches!(
            world.last_outcome,
            Some(ApplyOutcome::LocationRejected { .. })
        ),
        "outcome was {:?}",
        world.last_outcome
    );
}

#[then("the message is dropped as an unknown topic")]
fn unknown_topic(world: &mut MonitorWorld) {
    assert_eq!(world.last_outcome, Some(ApplyOutcome::UnknownTopic));
}

#[then("the reading state is unchanged")]
fn state_unchanged(world: &mut MonitorWorld) {
    let previous = world.previous_state.as_ref().expect("no previous state");
    assert_eq!(world.reading_state(), previous);
}

#[then(expr = "building the topic table fails mentioning {string}")]
fn table_fails(world: &mut MonitorWorld, fragment: String) {
    let error = world.table_error.as_ref().expect("topic table was accepted");
    assert!(error.contains(&fragment), "{}", error);
}
