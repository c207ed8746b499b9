//! Latest known reading per sensor and the reducer that advances it

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sensor::SensorKey;
use crate::topics::TopicTable;

/// Text shown for a reading before its first message arrives
pub const PLACEHOLDER: &str = "---";

/// A latitude/longitude pair reported by the location topic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Why a location payload was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationParseError {
    #[error("expected 2 comma-separated fields, got {0}")]
    FieldCount(usize),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("coordinates out of range")]
    OutOfRange,
}

/// Parse a `"<lat>,<lon>"` payload
pub fn parse_location(raw: &str) -> Result<Coordinates, LocationParseError> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() != 2 {
        return Err(LocationParseError::FieldCount(fields.len()));
    }

    let mut values = [0.0f64; 2];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value: f64 = field
            .parse()
            .map_err(|_| LocationParseError::NotANumber(field.to_string()))?;
        // f64::from_str accepts "NaN" and "inf"
        if !value.is_finite() {
            return Err(LocationParseError::NotANumber(field.to_string()));
        }
        *slot = value;
    }

    let [lat, lon] = values;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(LocationParseError::OutOfRange);
    }
    Ok(Coordinates { lat, lon })
}

/// What a single [`ReadingState::apply`] did
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The reading for this key was replaced
    Updated(SensorKey),
    /// A malformed location payload; the previous location is kept
    LocationRejected {
        raw: String,
        error: LocationParseError,
    },
    /// No key subscribes to this topic; nothing changed
    UnknownTopic,
}

/// Result of running the reducer: the next snapshot and what happened
#[derive(Debug, Clone)]
pub struct Applied {
    pub state: ReadingState,
    pub outcome: ApplyOutcome,
}

/// Latest observed value for every semantic key.
///
/// Snapshots are values: [`apply`](ReadingState::apply) returns a new state and
/// leaves `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingState {
    values: BTreeMap<SensorKey, String>,
    location: Option<Coordinates>,
}

impl ReadingState {
    /// All text readings at the placeholder, no location
    pub fn new() -> Self {
        let values = SensorKey::ALL
            .into_iter()
            .filter(|key| !key.is_location())
            .map(|key| (key, PLACEHOLDER.to_string()))
            .collect();
        Self {
            values,
            location: None,
        }
    }

    /// Text value of a non-location key
    pub fn value(&self, key: SensorKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    /// Fold one inbound `(topic, raw)` message into a new snapshot.
    ///
    /// At most one key differs between `self` and the returned state. Text
    /// readings are stored verbatim; only the location payload is parsed.
    pub fn apply(&self, table: &TopicTable, topic: &str, raw: &str) -> Applied {
        let Some(key) = table.key_for(topic) else {
            tracing::debug!("Dropping message on unsubscribed topic '{}'", topic);
            return Applied {
                state: self.clone(),
                outcome: ApplyOutcome::UnknownTopic,
            };
        };

        let mut next = self.clone();
        if key.is_location() {
            match parse_location(raw) {
                Ok(coordinates) => next.location = Some(coordinates),
                Err(error) => {
                    tracing::warn!("Rejected location payload '{}': {}", raw, error);
                    return Applied {
                        state: next,
                        outcome: ApplyOutcome::LocationRejected {
                            raw: raw.to_string(),
                            error,
                        },
                    };
                }
            }
        } else {
            next.values.insert(key, raw.to_string());
        }

        tracing::debug!("Reading '{}' <- '{}'", key, raw);
        Applied {
            state: next,
            outcome: ApplyOutcome::Updated(key),
        }
    }

    /// JSON object keyed by semantic key; location is `{lat, lon}` or `null`
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(SensorKey::ALL.len());
        for key in SensorKey::ALL {
            let value = if key.is_location() {
                serde_json::to_value(self.location).unwrap_or(serde_json::Value::Null)
            } else {
                serde_json::Value::String(self.value(key).unwrap_or(PLACEHOLDER).to_string())
            };
            map.insert(key.as_str().to_string(), value);
        }
        serde_json::Value::Object(map)
    }
}

impl Default for ReadingState {
    fn default() -> Self {
        Self::new()
    }
}
