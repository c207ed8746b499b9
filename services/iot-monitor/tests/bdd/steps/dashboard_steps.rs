//! BDD step definitions for the dashboard

use axum::body::Body;
use axum::http::Request;
use cucumber::{given, then, when};
use iot_monitor::dashboard::{build_router, DashboardOptions};
use iot_monitor::state::new_state_handle;
use iot_monitor::topics::TopicTable;
use tower::ServiceExt;

use crate::world::MonitorWorld;

#[given("a dashboard with no readings")]
fn empty_dashboard(world: &mut MonitorWorld) {
    world.shared_state = Some(new_state_handle("ws://localhost:9001/mqtt"));
}

#[given(expr = "the dashboard has received {string} on {string}")]
async fn dashboard_received(world: &mut MonitorWorld, raw: String, topic: String) {
    let handle = world.shared_state.as_ref().expect("state not set");
    let mut s = handle.write().await;
    let applied = s.snapshot().apply(&TopicTable::default(), &topic, &raw);
    s.publish(applied, 1000);
}

#[when("the dashboard index page is requested")]
async fn request_index(world: &mut MonitorWorld) {
    let state = world.shared_state.as_ref().expect("state not set").clone();
    let app = build_router(state, DashboardOptions::default());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut MonitorWorld, expected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(
        body.contains(&expected),
        "Expected response to contain '{}', but it didn't.\nResponse body:\n{}",
        expected,
        body
    );
}

#[then("the page has no map")]
fn no_map(world: &mut MonitorWorld) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(!body.contains("L.map("), "Unexpected map in:\n{}", body);
}

#[then(expr = "the page shows a map centered at {string} with a marker there")]
fn map_centered(world: &mut MonitorWorld, point: String) {
    let body = world.response_body.as_ref().expect("no response body");
    let center = format!("setView([{}],", point);
    let marker = format!("L.marker([{}])", point);
    assert!(body.contains(&center), "Missing '{}' in:\n{}", center, body);
    assert!(body.contains(&marker), "Missing '{}' in:\n{}", marker, body);
}
