//! Semantic sensor keys and their factory topics

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Short internal name for one reading published by the sensor boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorKey {
    #[serde(rename = "temp")]
    Temp,
    #[serde(rename = "hum")]
    Hum,
    #[serde(rename = "o2Raw")]
    O2Raw,
    #[serde(rename = "o2Percent")]
    O2Percent,
    #[serde(rename = "luxRaw")]
    LuxRaw,
    #[serde(rename = "luxEst")]
    LuxEst,
    #[serde(rename = "uvRaw")]
    UvRaw,
    #[serde(rename = "uvPower")]
    UvPower,
    #[serde(rename = "soundRaw")]
    SoundRaw,
    #[serde(rename = "soundDB")]
    SoundDb,
    #[serde(rename = "scdCo2")]
    ScdCo2,
    #[serde(rename = "scdTemp")]
    ScdTemp,
    #[serde(rename = "scdHum")]
    ScdHum,
    #[serde(rename = "co")]
    Co,
    #[serde(rename = "no2")]
    No2,
    #[serde(rename = "etanol")]
    Etanol,
    #[serde(rename = "nh3")]
    Nh3,
    #[serde(rename = "ch4")]
    Ch4,
    #[serde(rename = "bmpTemp")]
    BmpTemp,
    #[serde(rename = "bmpPresion")]
    BmpPresion,
    #[serde(rename = "ubicacion")]
    Ubicacion,
}

impl SensorKey {
    /// Every key, in declaration order
    pub const ALL: [SensorKey; 21] = [
        SensorKey::Temp,
        SensorKey::Hum,
        SensorKey::O2Raw,
        SensorKey::O2Percent,
        SensorKey::LuxRaw,
        SensorKey::LuxEst,
        SensorKey::UvRaw,
        SensorKey::UvPower,
        SensorKey::SoundRaw,
        SensorKey::SoundDb,
        SensorKey::ScdCo2,
        SensorKey::ScdTemp,
        SensorKey::ScdHum,
        SensorKey::Co,
        SensorKey::No2,
        SensorKey::Etanol,
        SensorKey::Nh3,
        SensorKey::Ch4,
        SensorKey::BmpTemp,
        SensorKey::BmpPresion,
        SensorKey::Ubicacion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SensorKey::Temp => "temp",
            SensorKey::Hum => "hum",
            SensorKey::O2Raw => "o2Raw",
            SensorKey::O2Percent => "o2Percent",
            SensorKey::LuxRaw => "luxRaw",
            SensorKey::LuxEst => "luxEst",
            SensorKey::UvRaw => "uvRaw",
            SensorKey::UvPower => "uvPower",
            SensorKey::SoundRaw => "soundRaw",
            SensorKey::SoundDb => "soundDB",
            SensorKey::ScdCo2 => "scdCo2",
            SensorKey::ScdTemp => "scdTemp",
            SensorKey::ScdHum => "scdHum",
            SensorKey::Co => "co",
            SensorKey::No2 => "no2",
            SensorKey::Etanol => "etanol",
            SensorKey::Nh3 => "nh3",
            SensorKey::Ch4 => "ch4",
            SensorKey::BmpTemp => "bmpTemp",
            SensorKey::BmpPresion => "bmpPresion",
            SensorKey::Ubicacion => "ubicacion",
        }
    }

    /// Topic the sensor boards publish this reading on out of the box
    pub fn default_topic(self) -> &'static str {
        match self {
            SensorKey::Temp => "esp32/dht22/temperatura",
            SensorKey::Hum => "esp32/dht22/humedad",
            SensorKey::O2Raw => "esp32/o2/raw",
            SensorKey::O2Percent => "esp32/o2/percent",
            SensorKey::LuxRaw => "esp32/temt6000/lux_raw",
            SensorKey::LuxEst => "esp32/temt6000/lux_est",
            SensorKey::UvRaw => "esp32/uv/raw",
            SensorKey::UvPower => "esp32/uv/uWcm2",
            SensorKey::SoundRaw => "esp32/sound/raw",
            SensorKey::SoundDb => "esp32/sound/db_est",
            SensorKey::ScdCo2 => "esp32/scd41/co2",
            SensorKey::ScdTemp => "esp32/scd41/temp",
            SensorKey::ScdHum => "esp32/scd41/hum",
            SensorKey::Co => "esp32/gas/co",
            SensorKey::No2 => "esp32/gas/no2",
            SensorKey::Etanol => "esp32/gas/etanol",
            SensorKey::Nh3 => "esp32/gas/nh3",
            SensorKey::Ch4 => "esp32/gas/ch4",
            SensorKey::BmpTemp => "esp32/bmp280/temp",
            SensorKey::BmpPresion => "esp32/bmp280/presion",
            SensorKey::Ubicacion => "esp32/ubicacion",
        }
    }

    /// The location reading carries coordinates instead of free text
    pub fn is_location(self) -> bool {
        self == SensorKey::Ubicacion
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKey {
    type Err = MonitorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SensorKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| MonitorError::Config(format!("Unknown sensor key: {}", s)))
    }
}
