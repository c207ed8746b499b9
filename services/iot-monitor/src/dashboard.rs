//! Web dashboard: rendered sensor page plus JSON API endpoints

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use crate::config::DashboardConfig;
use crate::layout::{render, Layout, MapOptions, MapView};
use crate::state::StateHandle;

/// One day; anything longer is not a live view
const MAX_REFRESH_INTERVAL_SECONDS: u64 = 86_400;

/// Presentation settings for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub map: MapOptions,
    pub refresh_interval_seconds: u64,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            map: MapOptions::default(),
            refresh_interval_seconds: 5,
        }
    }
}

impl From<&DashboardConfig> for DashboardOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            map: MapOptions {
                zoom: config.map_zoom,
            },
            refresh_interval_seconds: config
                .refresh_interval_seconds
                .clamp(1, MAX_REFRESH_INTERVAL_SECONDS),
        }
    }
}

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub options: DashboardOptions,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, options: DashboardOptions) -> Router {
    let dashboard_state = DashboardState { state, options };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/layout", get(layout_handler))
        .route("/api/readings", get(readings_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

async fn current_layout(dashboard: &DashboardState) -> Layout {
    // Release the lock before rendering
    let snapshot = dashboard.state.read().await.snapshot();
    render(&snapshot, &dashboard.options.map)
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let layout = current_layout(&dashboard).await;
    Html(render_page(&layout, dashboard.options.refresh_interval_seconds))
}

async fn layout_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    axum::Json(current_layout(&dashboard).await)
}

async fn readings_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let snapshot = dashboard.state.read().await.snapshot();
    axum::Json(snapshot.to_json())
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    axum::Json(serde_json::json!({
        "broker_url": state.broker_url,
        "connection": state.connection,
        "subscribed_topics": state.subscribed_topics,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "stats": state.stats,
    }))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

/// Minimal HTML escaping for broker-provided text
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_map(map: &MapView) -> String {
    let [lat, lon] = map.center;
    let [marker_lat, marker_lon] = map.marker;
    format!(
        r#"<div id="map" data-lat="{lat}" data-lon="{lon}" style="height: 400px; margin: 20px 0; border-radius: 10px; overflow: hidden;"></div>
    <script>
        const map = L.map('map').setView([{lat}, {lon}], {zoom});
        L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
            attribution: '&copy; <a href="https://www.openstreetmap.org/">OpenStreetMap</a> contributors'
        }}).addTo(map);
        L.marker([{marker_lat}, {marker_lon}]).addTo(map).bindPopup('{popup}');
    </script>"#,
        lat = lat,
        lon = lon,
        marker_lat = marker_lat,
        marker_lon = marker_lon,
        zoom = map.zoom,
        popup = html_escape(map.popup),
    )
}

fn render_page(layout: &Layout, refresh_interval_seconds: u64) -> String {
    let map_html = layout.map.as_ref().map(render_map).unwrap_or_default();

    let sections: String = layout
        .sections
        .iter()
        .map(|section| {
            let cards: String = section
                .cards
                .iter()
                .map(|card| {
                    format!(
                        r#"<div class="card" style="background: #f8f8f8; padding: 1rem; border-radius: 10px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); min-width: 220px; flex: 1 1 250px; margin: 10px;">
                    <h3 style="margin: 0; color: #1e1e1e;">{title}</h3>
                    <p style="font-size: 24px; color: {color}; margin: 10px 0;"><b id="value-{key}">{value}</b></p>
                    <p style="font-size: 14px; color: #666;">{subtitle}</p>
                </div>"#,
                        title = html_escape(card.title),
                        color = card.color,
                        key = card.key,
                        value = html_escape(&card.value),
                        subtitle = html_escape(card.subtitle),
                    )
                })
                .collect();
            format!(
                r#"<h2>{title}</h2>
    <div style="display: flex; flex-wrap: wrap; justify-content: center;">
                {cards}
    </div>"#,
                title = html_escape(section.title),
                cards = cards,
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script>
        function refreshData() {{
            fetch('/api/layout')
                .then(r => r.json())
                .then(layout => {{
                    const mapDiv = document.getElementById('map');
                    const shown = mapDiv ? [Number(mapDiv.dataset.lat), Number(mapDiv.dataset.lon)] : null;
                    const wanted = layout.map ? layout.map.center : null;
                    if (JSON.stringify(shown) !== JSON.stringify(wanted)) {{
                        window.location.reload();
                        return;
                    }}
                    layout.sections.forEach(section => section.cards.forEach(card => {{
                        const el = document.getElementById('value-' + card.key);
                        if (el) {{
                            el.textContent = card.value;
                        }}
                    }}));
                }});
        }}
        setInterval(refreshData, {refresh_ms});
    </script>
</head>
<body style="font-family: Arial, sans-serif; padding: 20px; max-width: 1200px; margin: auto; background-color: #1e1e1e; color: #eee;">
    <h1 style="text-align: center;">{title}</h1>
    <p style="text-align: center;">{subtitle}</p>
    {map_html}
    {sections}
</body>
</html>"#,
        title = html_escape(layout.title),
        subtitle = html_escape(layout.subtitle),
        refresh_ms = refresh_interval_seconds.saturating_mul(1000),
        map_html = map_html,
        sections = sections,
    )
}
