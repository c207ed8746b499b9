//! Configuration types for the IoT monitor service

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sensor::SensorKey;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Per-key topic overrides; keys not listed keep their factory topic
    #[serde(default)]
    pub topics: BTreeMap<SensorKey, String>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Message broker connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// `wss://` or `ws://` endpoint of the broker
    #[serde(default = "default_broker_url")]
    pub url: String,
    /// Generated per process when absent
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u64,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_seconds: u64,
    #[serde(default)]
    pub qos: u8,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            client_id: None,
            keep_alive_seconds: default_keep_alive(),
            reconnect_delay_seconds: default_reconnect_delay(),
            qos: 0,
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_map_zoom")]
    pub map_zoom: u8,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            map_zoom: default_map_zoom(),
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

fn default_broker_url() -> String {
    "wss://test.mosquitto.org:8081/mqtt".to_string()
}

fn default_keep_alive() -> u64 {
    30
}

fn default_reconnect_delay() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11120
}

fn default_map_zoom() -> u8 {
    13
}

fn default_refresh_interval() -> u64 {
    5
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::MonitorError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
