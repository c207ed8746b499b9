//! Pure rendering of a reading snapshot into the dashboard layout

use serde::Serialize;

use crate::reading::{ReadingState, PLACEHOLDER};
use crate::sensor::SensorKey;

const DEFAULT_COLOR: &str = "#333";

pub const PAGE_TITLE: &str = "IoT Monitor - Environmental Sensors";
pub const PAGE_SUBTITLE: &str = "Live data over MQTT";
pub const MAP_POPUP: &str = "Estimated ESP32 location";

/// Fixed presentation of one sensor card
#[derive(Debug, Clone, Copy)]
pub struct CardSpec {
    pub key: SensorKey,
    pub title: &'static str,
    pub unit: Option<&'static str>,
    pub color: &'static str,
    pub subtitle: &'static str,
}

const fn card(
    key: SensorKey,
    title: &'static str,
    unit: Option<&'static str>,
    color: Option<&'static str>,
    subtitle: &'static str,
) -> CardSpec {
    CardSpec {
        key,
        title,
        unit,
        color: match color {
            Some(color) => color,
            None => DEFAULT_COLOR,
        },
        subtitle,
    }
}

pub const LOCAL_SECTION_TITLE: &str = "Local Sensors (ESP32)";
pub const EXTERNAL_SECTION_TITLE: &str = "External Sensors (Arduino)";

pub const LOCAL_CARDS: [CardSpec; 10] = [
    card(SensorKey::Temp, "Temperature (DHT22)", Some("°C"), None, "DHT22 sensor"),
    card(SensorKey::Hum, "Humidity (DHT22)", Some("%"), None, "DHT22 sensor"),
    card(SensorKey::O2Raw, "O₂ raw (ADC)", None, None, "Grove O₂ sensor"),
    card(
        SensorKey::O2Percent,
        "Estimated oxygen",
        Some("%"),
        Some("#27ae60"),
        "Grove O₂ sensor (0–25%)",
    ),
    card(SensorKey::LuxRaw, "Light raw (ADC)", None, None, "TEMT6000 sensor"),
    card(
        SensorKey::LuxEst,
        "Estimated illuminance",
        Some("lux"),
        Some("#2980b9"),
        "TEMT6000 sensor",
    ),
    card(SensorKey::UvRaw, "UV raw (ADC)", None, None, "Waveshare UV sensor"),
    card(
        SensorKey::UvPower,
        "Estimated UV",
        Some("µW/cm²"),
        Some("#8e44ad"),
        "Waveshare UV (200–370 nm)",
    ),
    card(SensorKey::SoundRaw, "Sound raw (ADC)", None, None, "KY-037 sensor"),
    card(
        SensorKey::SoundDb,
        "Sound level",
        Some("dB"),
        Some("#2c3e50"),
        "KY-037 sensor (uncalibrated)",
    ),
];

pub const EXTERNAL_CARDS: [CardSpec; 10] = [
    card(
        SensorKey::ScdCo2,
        "CO₂ (SCD41)",
        Some("ppm"),
        Some("#16a085"),
        "SCD41 sensor",
    ),
    card(SensorKey::ScdTemp, "Temperature (SCD41)", Some("°C"), None, "SCD41 sensor"),
    card(SensorKey::ScdHum, "Humidity (SCD41)", Some("%"), None, "SCD41 sensor"),
    card(SensorKey::Co, "CO", Some("ppm"), None, "Multichannel gas sensor"),
    card(SensorKey::No2, "NO₂", Some("ppm"), None, "Multichannel gas sensor"),
    card(SensorKey::Etanol, "Ethanol", Some("ppm"), None, "Multichannel gas sensor"),
    card(SensorKey::Nh3, "NH₃", Some("ppm"), None, "Multichannel gas sensor"),
    card(SensorKey::Ch4, "CH₄", Some("ppm"), None, "Multichannel gas sensor"),
    card(SensorKey::BmpTemp, "Temperature (BMP280)", Some("°C"), None, "BMP280 sensor"),
    card(SensorKey::BmpPresion, "Pressure (BMP280)", Some("hPa"), None, "BMP280 sensor"),
];

/// Map widget settings that are not derived from data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self { zoom: 13 }
    }
}

/// One rendered card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub key: SensorKey,
    pub title: &'static str,
    pub value: String,
    pub color: &'static str,
    pub subtitle: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub cards: Vec<Card>,
}

/// Map centered on the reported location with a single marker there
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub marker: [f64; 2],
    pub zoom: u8,
    pub popup: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub map: Option<MapView>,
    pub sections: Vec<Section>,
}

/// Render a snapshot. Same input, same layout.
pub fn render(state: &ReadingState, map: &MapOptions) -> Layout {
    let map = state.location().map(|location| {
        let point = [location.lat, location.lon];
        MapView {
            center: point,
            marker: point,
            zoom: map.zoom,
            popup: MAP_POPUP,
        }
    });

    Layout {
        title: PAGE_TITLE,
        subtitle: PAGE_SUBTITLE,
        map,
        sections: vec![
            render_section(LOCAL_SECTION_TITLE, &LOCAL_CARDS, state),
            render_section(EXTERNAL_SECTION_TITLE, &EXTERNAL_CARDS, state),
        ],
    }
}

fn render_section(title: &'static str, specs: &[CardSpec], state: &ReadingState) -> Section {
    let cards = specs
        .iter()
        .map(|spec| {
            let value = state.value(spec.key).unwrap_or(PLACEHOLDER);
            Card {
                key: spec.key,
                title: spec.title,
                value: match spec.unit {
                    Some(unit) => format!("{} {}", value, unit),
                    None => value.to_string(),
                },
                color: spec.color,
                subtitle: spec.subtitle,
            }
        })
        .collect();
    Section { title, cards }
}
