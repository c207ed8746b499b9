//! Broker session abstraction and the rumqttc-backed implementation
//!
//! The subscriber only talks to [`BrokerSession`], so tests can drive it with
//! scripted events instead of a live broker. [`MqttSession`] is the production
//! implementation: MQTT over WebSocket (optionally TLS) via rumqttc, which also
//! owns reconnection.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Request, Transport,
};

use crate::config::BrokerConfig;
use crate::error::{MonitorError, Result};

const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Something the broker connection reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    /// The broker accepted the connection (initial or after reconnect)
    Connected,
    /// A PUBLISH on one of the subscribed topics
    Message { topic: String, payload: Vec<u8> },
    /// Transport or protocol failure; the session keeps going
    Error(String),
}

/// One logical connection to a publish/subscribe broker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerSession: Send {
    /// Request a subscription to an exact topic
    async fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// Wait for the next event from the broker
    async fn next_event(&mut self) -> BrokerEvent;

    /// Close the connection
    async fn disconnect(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Ws,
    Wss,
}

/// Extract scheme and port from a `ws://` / `wss://` broker URL
fn parse_broker_url(url: &str) -> Result<(Scheme, u16)> {
    let (scheme, rest) = if let Some(rest) = url.strip_prefix("wss://") {
        (Scheme::Wss, rest)
    } else if let Some(rest) = url.strip_prefix("ws://") {
        (Scheme::Ws, rest)
    } else {
        return Err(MonitorError::Config(format!(
            "Broker URL must start with ws:// or wss://: {}",
            url
        )));
    };

    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(MonitorError::Config(format!(
            "Broker URL has no host: {}",
            url
        )));
    }

    let port = match authority.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => port.parse().map_err(|_| {
            MonitorError::Config(format!("Invalid port '{}' in broker URL {}", port, url))
        })?,
        Some(_) => {
            return Err(MonitorError::Config(format!(
                "Broker URL has no host: {}",
                url
            )))
        }
        None => match scheme {
            Scheme::Wss => 443,
            Scheme::Ws => 80,
        },
    };

    Ok((scheme, port))
}

fn qos_from_level(level: u8) -> Result<QoS> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(MonitorError::Config(format!(
            "QoS must be 0, 1 or 2, got {}",
            other
        ))),
    }
}

/// Client id unique enough for a shared public broker
pub fn generate_client_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    format!("iot-monitor-{:08x}", nanos ^ std::process::id())
}

/// rumqttc session over WebSocket transport
pub struct MqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
    qos: QoS,
    reconnect_delay: Duration,
    backoff_pending: bool,
}

impl MqttSession {
    /// Prepare a session; the connection is opened on the first `next_event`.
    ///
    /// `topic_count` sizes the request channel: subscriptions are queued from the
    /// same task that polls the event loop, so they must all fit without blocking.
    pub fn new(config: &BrokerConfig, topic_count: usize) -> Result<Self> {
        let (scheme, port) = parse_broker_url(&config.url)?;
        let qos = qos_from_level(config.qos)?;
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(generate_client_id);

        let mut options = MqttOptions::new(client_id.clone(), config.url.clone(), port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_seconds).max(MIN_KEEP_ALIVE));
        options.set_clean_session(true);
        options.set_transport(match scheme {
            Scheme::Wss => Transport::wss_with_default_config(),
            Scheme::Ws => Transport::Ws,
        });

        tracing::debug!(
            "MQTT session for {} as '{}' (qos={:?})",
            config.url,
            client_id,
            qos
        );

        let (client, eventloop) = AsyncClient::new(options, topic_count + 16);
        Ok(Self {
            client,
            eventloop,
            qos,
            reconnect_delay: Duration::from_secs(config.reconnect_delay_seconds),
            backoff_pending: false,
        })
    }

    /// Forget SUBSCRIBEs rumqttc parked for replay after a dropped link.
    ///
    /// The subscriber re-issues every topic on the next ConnAck, so replaying
    /// these as well would subscribe some topics twice on one connection.
    fn discard_pending_subscribes(&mut self) {
        self.eventloop
            .pending
            .retain(|request| !matches!(request, Request::Subscribe(_)));
    }
}

#[async_trait]
impl BrokerSession for MqttSession {
    async fn subscribe(&mut self, topic: &str) -> Result<()> {
        self.client
            .subscribe(topic, self.qos)
            .await
            .map_err(|e| MonitorError::Broker(format!("Subscribe to '{}' failed: {}", topic, e)))
    }

    async fn next_event(&mut self) -> BrokerEvent {
        if self.backoff_pending {
            self.backoff_pending = false;
            tokio::time::sleep(self.reconnect_delay).await;
        }

        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => return BrokerEvent::Connected,
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    return BrokerEvent::Message {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    }
                }
                Ok(_) => continue,
                Err(e) => {
                    self.discard_pending_subscribes();
                    self.backoff_pending = true;
                    return BrokerEvent::Error(e.to_string());
                }
            }
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.client
            .disconnect()
            .await
            .map_err(|e| MonitorError::Broker(format!("Disconnect request failed: {}", e)))?;

        let eventloop = &mut self.eventloop;
        let flush = async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => return Ok(()),
                    Ok(_) => continue,
                    Err(e) => {
                        return Err(MonitorError::Broker(format!("Disconnect failed: {}", e)))
                    }
                }
            }
        };

        tokio::time::timeout(DISCONNECT_TIMEOUT, flush)
            .await
            .map_err(|_| MonitorError::Broker("Timed out sending DISCONNECT".to_string()))?
    }
}
