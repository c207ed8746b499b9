//! Fixed mapping between semantic keys and broker topics

use std::collections::{BTreeMap, HashMap};

use crate::error::{MonitorError, Result};
use crate::sensor::SensorKey;

/// Immutable key/topic mapping built once at startup.
///
/// Holds every [`SensorKey`] and the reverse index used to route inbound
/// messages. The mapping is one-to-one; construction refuses anything else.
#[derive(Debug, Clone)]
pub struct TopicTable {
    topics: BTreeMap<SensorKey, String>,
    by_topic: HashMap<String, SensorKey>,
}

impl TopicTable {
    /// Build the table from factory topics, replacing the ones named in `overrides`
    pub fn new(overrides: &BTreeMap<SensorKey, String>) -> Result<Self> {
        let topics: BTreeMap<SensorKey, String> = SensorKey::ALL
            .into_iter()
            .map(|key| {
                let topic = overrides
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| key.default_topic().to_string());
                (key, topic)
            })
            .collect();

        let mut by_topic = HashMap::with_capacity(topics.len());
        for (key, topic) in &topics {
            validate_topic(*key, topic)?;
            if let Some(existing) = by_topic.insert(topic.clone(), *key) {
                return Err(MonitorError::Config(format!(
                    "Topic '{}' is assigned to both '{}' and '{}'",
                    topic, existing, key
                )));
            }
        }

        Ok(Self { topics, by_topic })
    }

    /// Semantic key whose topic equals `topic` exactly
    pub fn key_for(&self, topic: &str) -> Option<SensorKey> {
        self.by_topic.get(topic).copied()
    }

    pub fn topic_for(&self, key: SensorKey) -> &str {
        // Every key is inserted by `new`
        self.topics.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// All (key, topic) pairs in key order
    pub fn topics(&self) -> impl Iterator<Item = (SensorKey, &str)> {
        self.topics.iter().map(|(key, topic)| (*key, topic.as_str()))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl Default for TopicTable {
    fn default() -> Self {
        let topics: BTreeMap<SensorKey, String> = SensorKey::ALL
            .into_iter()
            .map(|key| (key, key.default_topic().to_string()))
            .collect();
        let by_topic = topics
            .iter()
            .map(|(key, topic)| (topic.clone(), *key))
            .collect();
        Self { topics, by_topic }
    }
}

fn validate_topic(key: SensorKey, topic: &str) -> Result<()> {
    if topic.trim().is_empty() {
        return Err(MonitorError::Config(format!(
            "Topic for '{}' must not be empty",
            key
        )));
    }
    if topic.contains(['+', '#']) {
        return Err(MonitorError::Config(format!(
            "Topic '{}' for '{}' must not contain wildcards",
            topic, key
        )));
    }
    Ok(())
}
